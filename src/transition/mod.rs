//! Lost/found status transitions.

mod handler;
mod types;

pub use handler::StatusTransitionHandler;
pub use types::{TransitionContext, TransitionOutcome, TransitionTarget};
