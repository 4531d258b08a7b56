//! HTTP request handlers.
//!
//! Handlers stay thin: they resolve the event from its URL slugs, check
//! the permission the route requires, and delegate to the engine types
//! in [`roomshare_core`]. All domain rules live behind those calls.

pub mod metrics;
pub mod orders;
pub mod rooms;
pub mod settings;
pub mod stats;

use roomshare_core::types::EventRef;

use crate::error::AppError;
use crate::state::AppState;

/// Resolves `:organizer/:event` path slugs to an event, answering 404
/// when the pair is unknown.
pub(crate) async fn resolve_event(
    state: &AppState,
    organizer: &str,
    event: &str,
) -> Result<EventRef, AppError> {
    state
        .directory
        .resolve_event(organizer, event)
        .await?
        .ok_or_else(|| AppError::not_found("Event", format!("{organizer}/{event}")))
}
