//! Third-party found/lost reports.
//!
//! Reports never change the animal's status; they only notify the owner
//! and acknowledge the reporter.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::error::Result;
use crate::notification::NotificationEvent;
use crate::server::AppState;

use super::models::{
    ReportAcceptedResponse, ReportFoundRequest, ReportLostRequest, ThirdPartyReport,
};

/// Report that someone found the animal
#[tracing::instrument(name = "http.report_found", skip_all, fields(animal_id = %animal_id))]
pub async fn report_found(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    Json(request): Json<ReportFoundRequest>,
) -> Result<(StatusCode, Json<ReportAcceptedResponse>)> {
    let report = request.validate(state.settings.notifications.max_text_len)?;
    // Unknown animals are rejected before anything is scheduled
    state.animals.get_animal_by_id(&animal_id).await?;

    let ThirdPartyReport {
        actor,
        location,
        message,
    } = report;
    let event = NotificationEvent::reported_found(&animal_id, actor)
        .location_hint(location)
        .message(message);

    Ok(schedule(&state, event))
}

/// Report the animal as lost on the owner's behalf
#[tracing::instrument(name = "http.report_lost", skip_all, fields(animal_id = %animal_id))]
pub async fn report_lost(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    Json(request): Json<ReportLostRequest>,
) -> Result<(StatusCode, Json<ReportAcceptedResponse>)> {
    let report = request.validate(state.settings.notifications.max_text_len)?;
    state.animals.get_animal_by_id(&animal_id).await?;

    let ThirdPartyReport {
        actor,
        location,
        message,
    } = report;
    let event = NotificationEvent::reported_lost(&animal_id, actor)
        .location_hint(location)
        .message(message);

    Ok(schedule(&state, event))
}

fn schedule(state: &AppState, event: NotificationEvent) -> (StatusCode, Json<ReportAcceptedResponse>) {
    let response = ReportAcceptedResponse {
        accepted: true,
        event_id: event.id,
        kind: event.kind,
        timestamp: Utc::now(),
    };

    tracing::info!(event_id = %event.id, kind = %event.kind, "Report accepted");
    // Detached; the handle is not awaited
    drop(state.dispatcher.spawn_dispatch(event));

    (StatusCode::ACCEPTED, Json(response))
}
