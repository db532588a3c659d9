use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::{health, stats};
use super::metrics::prometheus_metrics;
use super::reports::{report_found, report_lost};
use super::status::change_status;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health, stats & metrics
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                // Owner status changes
                .route("/animals/{id}/status", post(change_status))
                // Third-party reports
                .route("/animals/{id}/report-found", post(report_found))
                .route("/animals/{id}/report-lost", post(report_lost)),
        )
}
