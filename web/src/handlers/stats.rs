//! Control handler for the statistics dashboard.

use axum::extract::{Path, State};
use axum::Json;
use roomshare_core::RoomError;
use roomshare_projections::StatsSnapshot;

use super::resolve_event;
use crate::error::AppError;
use crate::extractors::RequestActor;
use crate::state::AppState;

/// `GET /control/event/:organizer/:event/rooms/stats`
///
/// Full order/room cross-tabulation for the dashboard, computed on
/// demand from the directory and the room store.
pub async fn dashboard(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
) -> Result<Json<StatsSnapshot>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    if !state.gate.can_view_orders(&actor, event.id) {
        return Err(RoomError::PermissionDenied.into());
    }
    let snapshot = state.stats.snapshot(event.id).await?;
    Ok(Json(snapshot))
}
