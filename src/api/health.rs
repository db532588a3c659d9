use axum::{extract::State, Json};
use serde::Serialize;

use crate::notification::DispatcherStatsSnapshot;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub channels: ChannelHealth,
}

/// Whether each transport has provider credentials
#[derive(Debug, Serialize)]
pub struct ChannelHealth {
    pub email_configured: bool,
    pub sms_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub notifications: DispatcherStatsSnapshot,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        channels: ChannelHealth {
            email_configured: state.settings.email.is_configured(),
            sms_configured: state.settings.sms.is_configured(),
        },
    })
}

pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        notifications: state.dispatcher.stats(),
    })
}
