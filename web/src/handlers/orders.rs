//! Order-scoped handlers: staff reassignment and customer self-service.

use axum::extract::{Path, State};
use axum::Json;
use constant_time_eq::constant_time_eq;
use roomshare_core::password::verify_password;
use roomshare_core::types::{Actor, Membership, RoomId};
use roomshare_core::{LeaveOutcome, PasswordChangeOutcome, RoomError};
use serde::{Deserialize, Serialize};

use super::resolve_event;
use crate::error::AppError;
use crate::extractors::RequestActor;
use crate::state::AppState;

/// Body of the staff reassignment route.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Target room, or `null` to take the order out of its room.
    pub room: Option<RoomId>,
    /// Whether the order administers the target room.
    #[serde(default)]
    pub is_admin: bool,
}

/// Response of the staff reassignment route.
#[derive(Debug, Serialize)]
pub struct AssignResponse {
    /// The resulting membership; `null` when the order was cleared.
    pub membership: Option<Membership>,
}

/// `PUT /control/event/:organizer/:event/orders/:code/room`
///
/// Moves an order into a room (optionally as admin) or out of any room,
/// regardless of the order's current state.
pub async fn assign(
    State(state): State<AppState>,
    Path((organizer, event, code)): Path<(String, String, String)>,
    RequestActor(actor): RequestActor,
    Json(body): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    let order = state
        .directory
        .order_by_code(event.id, &code)
        .await?
        .ok_or_else(|| AppError::not_found("Order", &code))?;
    let membership = state
        .ledger
        .assign(
            event.id,
            order.id,
            body.room.map(|room| (room, body.is_admin)),
            &actor,
        )
        .await?;
    Ok(Json(AssignResponse { membership }))
}

/// Customer actions on an order's room.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ModifyRequest {
    /// Leave the current room.
    Leave,
    /// Join an existing room by name, proving its password.
    Join {
        /// Room name
        name: String,
        /// Room password
        password: String,
    },
    /// Create a room and become its admin.
    Create {
        /// Room name, unique within the event
        name: String,
        /// Room password
        password: String,
    },
    /// Change the room password. Admins only; a silent no-op otherwise.
    ChangePassword {
        /// New password
        password: String,
    },
}

/// Response of the customer modification route.
#[derive(Debug, Serialize)]
pub struct ModifyResponse {
    /// What happened: `left`, `not_in_room`, `joined`, `created`,
    /// `changed` or `not_admin`.
    pub outcome: &'static str,
    /// Room involved, where applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomId>,
    /// Room name, where applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModifyResponse {
    const fn outcome(outcome: &'static str) -> Self {
        Self {
            outcome,
            room: None,
            name: None,
        }
    }
}

/// `POST /event/:organizer/:event/order/:code/:secret/room`
///
/// Self-service room changes for the buyer. The path secret must match
/// the order's secret; a mismatch answers the same 404 as an unknown
/// order code so the route confirms nothing about either.
pub async fn modify(
    State(state): State<AppState>,
    Path((organizer, event, code, secret)): Path<(String, String, String, String)>,
    Json(body): Json<ModifyRequest>,
) -> Result<Json<ModifyResponse>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    let order = state
        .directory
        .order_by_code(event.id, &code)
        .await?
        .filter(|order| constant_time_eq(secret.as_bytes(), order.secret.as_bytes()))
        .ok_or_else(|| AppError::not_found("Order", &code))?;
    let actor = Actor::Order(order.id);

    let response = match body {
        ModifyRequest::Leave => match state.ledger.leave(event.id, order.id, &actor).await? {
            LeaveOutcome::Left { room } => ModifyResponse {
                outcome: "left",
                room: Some(room),
                name: None,
            },
            LeaveOutcome::NotInRoom => ModifyResponse::outcome("not_in_room"),
        },
        ModifyRequest::Join { name, password } => {
            let room = state
                .registry
                .find_by_name(event.id, &name)
                .await
                .map_err(AppError::form)?;
            if !verify_password(&room.password_hash, password.trim()).map_err(AppError::form)? {
                return Err(AppError::form(RoomError::PasswordMismatch));
            }
            state
                .ledger
                .join(event.id, room.id, order.id, false, &actor)
                .await?;
            ModifyResponse {
                outcome: "joined",
                room: Some(room.id),
                name: Some(room.name),
            }
        }
        ModifyRequest::Create { name, password } => {
            if state.ledger.membership(order.id).await?.is_some() {
                return Err(RoomError::AlreadyInRoom.into());
            }
            let room = state
                .registry
                .create_or_update(event.id, None, &name, &password, Some((order.id, &actor)))
                .await
                .map_err(AppError::form)?;
            state
                .ledger
                .join(event.id, room.id, order.id, true, &actor)
                .await?;
            ModifyResponse {
                outcome: "created",
                room: Some(room.id),
                name: Some(room.name),
            }
        }
        ModifyRequest::ChangePassword { password } => {
            let outcome = state
                .ledger
                .change_password(event.id, order.id, &password, &actor)
                .await
                .map_err(AppError::form)?;
            match outcome {
                PasswordChangeOutcome::Changed => ModifyResponse::outcome("changed"),
                PasswordChangeOutcome::NotAdmin => ModifyResponse::outcome("not_admin"),
                PasswordChangeOutcome::NotInRoom => ModifyResponse::outcome("not_in_room"),
            }
        }
    };
    Ok(Json(response))
}
