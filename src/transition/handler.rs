use std::sync::Arc;

use chrono::Utc;

use crate::animal::{AnimalStore, AnimalUpdate, LostStatus, StoreError};
use crate::auth::AuthorizationResolver;
use crate::error::{AppError, Result};
use crate::metrics::TransitionMetrics;
use crate::notification::{NotificationDispatcher, NotificationEvent};

use super::{TransitionContext, TransitionOutcome, TransitionTarget};

/// Applies lost/found transitions and schedules the matching notification.
///
/// The mutation is persisted before returning; delivery runs detached and
/// its outcome never affects the transition.
pub struct StatusTransitionHandler {
    animals: Arc<dyn AnimalStore>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl StatusTransitionHandler {
    pub fn new(animals: Arc<dyn AnimalStore>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            animals,
            dispatcher,
        }
    }

    #[tracing::instrument(
        name = "transition.apply",
        skip(self, ctx),
        fields(caller = ctx.caller.as_deref().unwrap_or("anonymous"))
    )]
    pub async fn apply_transition(
        &self,
        animal_id: &str,
        target: TransitionTarget,
        ctx: TransitionContext,
    ) -> Result<TransitionOutcome> {
        let update = match target {
            TransitionTarget::Lost => AnimalUpdate {
                // Stamped by the store only if the animal is not already lost
                status: Some(LostStatus::Lost { since: Utc::now() }),
                lost_message: ctx.lost_message.map(Some),
                last_seen_location: ctx.last_seen_location.map(Some),
            },
            TransitionTarget::Found => {
                let animal = self
                    .animals
                    .get_animal_by_id(animal_id)
                    .await
                    .map_err(store_error)?;
                if !AuthorizationResolver::is_owner(ctx.caller.as_deref(), &animal) {
                    TransitionMetrics::record_rejected("not_owner");
                    tracing::warn!(
                        animal_id = %animal_id,
                        "Found transition rejected, caller is not the owner"
                    );
                    return Err(AppError::Unauthorized(
                        "Only the owner can mark this animal as found".to_string(),
                    ));
                }
                if !animal.lost_mode {
                    TransitionMetrics::record_applied(target.as_str(), false);
                    tracing::debug!(animal_id = %animal_id, "Animal is not lost, nothing to do");
                    return Ok(TransitionOutcome {
                        animal,
                        previous_lost: false,
                        new_lost: false,
                        changed: false,
                        notification: None,
                    });
                }
                AnimalUpdate {
                    status: Some(LostStatus::Found),
                    ..AnimalUpdate::default()
                }
            }
        };

        let applied = self
            .animals
            .update_animal(animal_id, update)
            .await
            .map_err(store_error)?;
        let changed = applied.changed();
        let previous_lost = applied.previous_lost;
        let animal = applied.animal;
        let new_lost = animal.lost_mode;
        TransitionMetrics::record_applied(target.as_str(), changed);

        let notification = if changed {
            let event = match target {
                TransitionTarget::Lost => NotificationEvent::owner_marked_lost(&animal.id)
                    .location_hint(animal.last_seen_location.clone())
                    .message(animal.lost_message.clone()),
                TransitionTarget::Found => NotificationEvent::owner_marked_found(&animal.id),
            };
            tracing::debug!(event_id = %event.id, kind = %event.kind, "Scheduling notification");
            Some(self.dispatcher.spawn_dispatch(event))
        } else {
            tracing::debug!("Status unchanged, no notification");
            None
        };

        tracing::info!(
            animal_id = %animal.id,
            target = %target,
            previous_lost = previous_lost,
            new_lost = new_lost,
            changed = changed,
            "Status transition applied"
        );

        Ok(TransitionOutcome {
            animal,
            previous_lost,
            new_lost,
            changed,
            notification,
        })
    }
}

fn store_error(err: StoreError) -> AppError {
    if matches!(err, StoreError::NotFound(_)) {
        TransitionMetrics::record_rejected("not_found");
    }
    AppError::from(err)
}
