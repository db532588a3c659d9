//! Owner-driven lost/found status changes

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};

use crate::error::Result;
use crate::server::AppState;
use crate::transition::{TransitionContext, TransitionTarget};

use super::models::{bounded_text, StatusChangeRequest, StatusChangeResponse};

/// Mark an animal lost or found.
///
/// Responds once the new status is stored; notifications are delivered in
/// the background.
#[tracing::instrument(
    name = "http.change_status",
    skip_all,
    fields(animal_id = %animal_id, status = %request.status)
)]
pub async fn change_status(
    State(state): State<AppState>,
    Path(animal_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<StatusChangeResponse>> {
    let max_len = state.settings.notifications.max_text_len;
    let lost_message = bounded_text("message", request.message, max_len)?;
    let last_seen_location = bounded_text("last_seen_location", request.last_seen_location, max_len)?;

    // Identity only gates the found path
    let caller = match request.status {
        TransitionTarget::Found => state.resolver.resolve_caller_identity(&headers).await,
        TransitionTarget::Lost => None,
    };

    let ctx = TransitionContext {
        caller,
        lost_message,
        last_seen_location,
    };

    let outcome = state
        .transitions
        .apply_transition(&animal_id, request.status, ctx)
        .await?;

    Ok(Json(outcome.into()))
}
