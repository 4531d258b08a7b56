//! Turns frozen checkout intent into durable memberships at order placement.
//!
//! The intent is captured into order metadata at confirmation and read back
//! here; live session state plays no part anymore. A vanished room is never
//! fatal: the order proceeds without one, loudly for `create` (the buyer
//! expected to own that room), quietly for `join`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditEntry};
use crate::checkout::{CartRoomState, RoomMode};
use crate::error::{Result, RoomError};
use crate::host::Clock;
use crate::metrics;
use crate::store::RoomStore;
use crate::types::{Actor, EventId, Membership, OrderId, RoomId};

// ============================================================================
// Frozen intent
// ============================================================================

/// Room intent as frozen into order metadata at checkout confirmation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RoomIntent {
    /// The buyer opted out (or never finished the step).
    #[default]
    None,
    /// The buyer owns this pending room and becomes its admin.
    Create {
        /// The pending room persisted during checkout.
        room: RoomId,
    },
    /// The buyer verified this room's password and joins as a member.
    Join {
        /// The join target.
        room: RoomId,
    },
}

impl RoomIntent {
    /// Extracts the intent to freeze from the live session state.
    ///
    /// A mode without its room id (a session that never made it through
    /// `submit`) degrades to [`RoomIntent::None`].
    #[must_use]
    pub fn from_cart(state: &CartRoomState) -> Self {
        match (state.mode, state.pending_create, state.join_target) {
            (Some(RoomMode::Create), Some(room), _) => Self::Create { room },
            (Some(RoomMode::Join), _, Some(room)) => Self::Join { room },
            _ => Self::None,
        }
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// What materialization did for one order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// The pending room exists; the order is now its admin member.
    AdminCreated,
    /// The target room exists; the order is now a plain member.
    MemberJoined,
    /// The intent was `none`; nothing to do.
    NoIntent,
    /// The referenced room disappeared between checkout and placement;
    /// the order proceeds without a room.
    RoomVanished,
    /// The order already had a membership; left untouched.
    AlreadyMaterialized,
}

impl MaterializeOutcome {
    /// Stable name, used as the metrics outcome label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AdminCreated => "admin_created",
            Self::MemberJoined => "member_joined",
            Self::NoIntent => "no_intent",
            Self::RoomVanished => "room_vanished",
            Self::AlreadyMaterialized => "already_materialized",
        }
    }
}

// ============================================================================
// Materializer
// ============================================================================

/// Applies [`RoomIntent`] to the store once an order exists.
pub struct OrderMaterializer {
    store: Arc<dyn RoomStore>,
    clock: Arc<dyn Clock>,
}

impl OrderMaterializer {
    /// Creates a materializer over the shared store.
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Materializes the frozen intent for a freshly placed order.
    ///
    /// Idempotent: an order that already has a membership is left alone.
    /// The membership insert and its audit entry commit atomically through
    /// the store; hosts running the Postgres store should invoke this
    /// inside their placement transaction.
    ///
    /// # Errors
    ///
    /// Only [`RoomError::Storage`]; every domain condition maps to an
    /// outcome variant instead.
    pub async fn order_placed(
        &self,
        event: EventId,
        order: OrderId,
        intent: RoomIntent,
    ) -> Result<MaterializeOutcome> {
        let outcome = self.apply(event, order, intent).await?;
        metrics::record_materialization(outcome.as_str());
        Ok(outcome)
    }

    async fn apply(
        &self,
        event: EventId,
        order: OrderId,
        intent: RoomIntent,
    ) -> Result<MaterializeOutcome> {
        if self.store.membership(order).await?.is_some() {
            tracing::debug!(order = %order, "order already materialized, skipping");
            return Ok(MaterializeOutcome::AlreadyMaterialized);
        }
        let (room, is_admin, action) = match intent {
            RoomIntent::None => return Ok(MaterializeOutcome::NoIntent),
            RoomIntent::Create { room } => (room, true, AuditAction::RoomCreated),
            RoomIntent::Join { room } => (room, false, AuditAction::OrderJoined),
        };
        if self.store.room(event, room).await?.is_none() {
            if is_admin {
                tracing::error!(
                    order = %order,
                    room = %room,
                    "pending room vanished before placement; order continues without a room"
                );
            } else {
                tracing::debug!(order = %order, room = %room, "join target vanished, skipping");
            }
            return Ok(MaterializeOutcome::RoomVanished);
        }
        let membership = Membership::new(order, room, is_admin);
        let entry = AuditEntry::new(action, Actor::System, event, self.clock.now())
            .for_order(order)
            .for_room(room);
        match self
            .store
            .insert_membership(&membership, std::slice::from_ref(&entry))
            .await
        {
            Ok(()) => {}
            // Lost a race against a concurrent materialization of the
            // same order; the membership exists, so the job is done.
            Err(RoomError::AlreadyInRoom) => {
                return Ok(MaterializeOutcome::AlreadyMaterialized);
            }
            Err(other) => return Err(other),
        }
        let outcome = if is_admin {
            tracing::info!(order = %order, room = %room, "order placed, room admin membership created");
            MaterializeOutcome::AdminCreated
        } else {
            tracing::info!(order = %order, room = %room, "order placed, room membership created");
            MaterializeOutcome::MemberJoined
        };
        Ok(outcome)
    }
}
