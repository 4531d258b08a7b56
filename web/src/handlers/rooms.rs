//! Control handlers for rooms: listing, detail and deletion.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use roomshare_core::types::RoomId;
use roomshare_core::RoomError;
use serde::Serialize;

use super::resolve_event;
use crate::error::AppError;
use crate::extractors::RequestActor;
use crate::state::AppState;

/// One row of the room list.
#[derive(Debug, Serialize)]
pub struct RoomSummary {
    /// Room identifier
    pub id: RoomId,
    /// Room name
    pub name: String,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Number of member orders
    pub members: u64,
}

/// Response body of the room list.
#[derive(Debug, Serialize)]
pub struct RoomList {
    /// Rooms of the event, sorted by name
    pub rooms: Vec<RoomSummary>,
}

/// `GET /control/event/:organizer/:event/rooms`
pub async fn list(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
) -> Result<Json<RoomList>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    if !state.gate.can_view_orders(&actor, event.id) {
        return Err(RoomError::PermissionDenied.into());
    }

    let (mut rooms, index) = tokio::try_join!(
        state.store.rooms(event.id),
        state.store.room_index(event.id),
    )?;
    rooms.sort_by(|a, b| a.name.cmp(&b.name));

    let mut counts: HashMap<RoomId, u64> = HashMap::new();
    for room in index.values() {
        *counts.entry(*room).or_default() += 1;
    }

    let rooms = rooms
        .into_iter()
        .map(|room| {
            let members = counts.get(&room.id).copied().unwrap_or(0);
            RoomSummary {
                id: room.id,
                name: room.name,
                created: room.created,
                members,
            }
        })
        .collect();
    Ok(Json(RoomList { rooms }))
}

/// One member of a room, joined against the order directory.
#[derive(Debug, Serialize)]
pub struct MemberView {
    /// Human-facing order code
    pub order: String,
    /// Buyer display name, if the host resolved one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Whether this member administers the room
    pub is_admin: bool,
}

/// Response body of the room detail view.
#[derive(Debug, Serialize)]
pub struct RoomDetail {
    /// Room identifier
    pub id: RoomId,
    /// Room name
    pub name: String,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Members, sorted by order code
    pub members: Vec<MemberView>,
}

/// `GET /control/event/:organizer/:event/rooms/:room`
pub async fn detail(
    State(state): State<AppState>,
    Path((organizer, event, room)): Path<(String, String, RoomId)>,
    RequestActor(actor): RequestActor,
) -> Result<Json<RoomDetail>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    if !state.gate.can_view_orders(&actor, event.id) {
        return Err(RoomError::PermissionDenied.into());
    }

    let room = state
        .store
        .room(event.id, room)
        .await?
        .ok_or(RoomError::RoomNotFound)?;
    let memberships = state.store.memberships_for_room(room.id).await?;
    let orders = try_join_all(
        memberships
            .iter()
            .map(|m| state.directory.order(event.id, m.order)),
    )
    .await?;

    // Memberships whose order vanished from the host are skipped rather
    // than failing the whole view.
    let mut members: Vec<MemberView> = memberships
        .iter()
        .zip(orders)
        .filter_map(|(membership, order)| {
            order.map(|order| MemberView {
                order: order.code,
                display_name: order.display_name,
                is_admin: membership.is_admin,
            })
        })
        .collect();
    members.sort_by(|a, b| a.order.cmp(&b.order));

    Ok(Json(RoomDetail {
        id: room.id,
        name: room.name,
        created: room.created,
        members,
    }))
}

/// Response body of a room deletion.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// How many memberships the cascade removed
    pub removed_members: usize,
}

/// `DELETE /control/event/:organizer/:event/rooms/:room`
pub async fn delete(
    State(state): State<AppState>,
    Path((organizer, event, room)): Path<(String, String, RoomId)>,
    RequestActor(actor): RequestActor,
) -> Result<Json<DeleteResponse>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    let removed_members = state.registry.delete(event.id, room, &actor).await?;
    Ok(Json(DeleteResponse { removed_members }))
}
