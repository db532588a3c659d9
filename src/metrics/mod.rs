//! Prometheus metrics for the notification service.
//!
//! - Status transitions (by target and whether the status changed)
//! - Notifications dispatched (by event kind)
//! - Channel sends (by channel and result) and send latency

mod helpers;

pub use helpers::{encode_metrics, NotifyMetrics, TransitionMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "lostpet";

lazy_static! {
    /// Lost/found transitions applied
    pub static ref STATUS_TRANSITIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_status_transitions_total", METRIC_PREFIX),
        "Total lost/found status transitions applied",
        &["target", "changed"]
    ).unwrap();

    /// Rejected transitions (not found, not the owner)
    pub static ref STATUS_TRANSITIONS_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_status_transitions_rejected_total", METRIC_PREFIX),
        "Total status transitions rejected before mutation",
        &["reason"]
    ).unwrap();

    /// Notification events dispatched
    pub static ref NOTIFICATIONS_DISPATCHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_notifications_dispatched_total", METRIC_PREFIX),
        "Total notification events dispatched",
        &["kind"]
    ).unwrap();

    /// Per-channel send results (sent, skipped, failed)
    pub static ref CHANNEL_SENDS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_channel_sends_total", METRIC_PREFIX),
        "Total channel send attempts by result",
        &["channel", "result"]
    ).unwrap();

    /// Transport call latency
    pub static ref CHANNEL_SEND_LATENCY: HistogramVec = register_histogram_vec!(
        format!("{}_channel_send_latency_seconds", METRIC_PREFIX),
        "Channel transport call latency in seconds",
        &["channel"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    ).unwrap();

    /// Detached notification tasks that panicked or were cancelled
    pub static ref NOTIFY_TASK_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_notify_task_failures_total", METRIC_PREFIX),
        "Total detached notification tasks that did not complete"
    ).unwrap();
}
