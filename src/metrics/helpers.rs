//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    CHANNEL_SENDS_TOTAL, CHANNEL_SEND_LATENCY, NOTIFICATIONS_DISPATCHED_TOTAL,
    NOTIFY_TASK_FAILURES_TOTAL, STATUS_TRANSITIONS_REJECTED_TOTAL, STATUS_TRANSITIONS_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording status transition metrics
pub struct TransitionMetrics;

impl TransitionMetrics {
    pub fn record_applied(target: &str, changed: bool) {
        let changed = if changed { "true" } else { "false" };
        STATUS_TRANSITIONS_TOTAL
            .with_label_values(&[target, changed])
            .inc();
    }

    pub fn record_rejected(reason: &str) {
        STATUS_TRANSITIONS_REJECTED_TOTAL
            .with_label_values(&[reason])
            .inc();
    }
}

/// Helper struct for recording notification delivery metrics
pub struct NotifyMetrics;

impl NotifyMetrics {
    pub fn record_dispatched(kind: &str) {
        NOTIFICATIONS_DISPATCHED_TOTAL
            .with_label_values(&[kind])
            .inc();
    }

    pub fn record_send(channel: &str, result: &str) {
        CHANNEL_SENDS_TOTAL
            .with_label_values(&[channel, result])
            .inc();
    }

    pub fn record_latency(channel: &str, elapsed: Duration) {
        CHANNEL_SEND_LATENCY
            .with_label_values(&[channel])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_task_failure() {
        NOTIFY_TASK_FAILURES_TOTAL.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_series() {
        NotifyMetrics::record_send("email", "skipped");
        TransitionMetrics::record_applied("lost", true);

        let output = encode_metrics().unwrap();
        assert!(output.contains("lostpet_channel_sends_total"));
        assert!(output.contains("lostpet_status_transitions_total"));
    }
}
