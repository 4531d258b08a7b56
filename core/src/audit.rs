//! Audit log vocabulary.
//!
//! Every mutating operation writes a structured entry: who did what to
//! which room/order, when, plus a small JSON payload (typically
//! `{"room": "<id>"}` so departures keep the prior room id). Entries are
//! handed to the store together with the mutation they describe and commit
//! atomically with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{Actor, EventId, OrderId, RoomId};

/// Symbolic action type of an audit entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    /// A room came into existence for an order (materialized create intent
    /// or post-placement create).
    #[serde(rename = "roomshare.room.created")]
    RoomCreated,
    /// A room's fields were changed by staff or an admin.
    #[serde(rename = "roomshare.room.changed")]
    RoomChanged,
    /// A room was deleted; every member order also receives an
    /// [`AuditAction::OrderLeft`] entry.
    #[serde(rename = "roomshare.room.deleted")]
    RoomDeleted,
    /// An order joined a room.
    #[serde(rename = "roomshare.order.joined")]
    OrderJoined,
    /// An order left its room (voluntarily, by reassignment, or through
    /// room deletion).
    #[serde(rename = "roomshare.order.left")]
    OrderLeft,
    /// A room admin changed the room password.
    #[serde(rename = "roomshare.room.password.changed")]
    PasswordChanged,
}

impl AuditAction {
    /// All actions, for rendering registries.
    pub const ALL: [Self; 6] = [
        Self::RoomCreated,
        Self::RoomChanged,
        Self::RoomDeleted,
        Self::OrderJoined,
        Self::OrderLeft,
        Self::PasswordChanged,
    ];

    /// Stable dotted action key, as stored in the log.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::RoomCreated => "roomshare.room.created",
            Self::RoomChanged => "roomshare.room.changed",
            Self::RoomDeleted => "roomshare.room.deleted",
            Self::OrderJoined => "roomshare.order.joined",
            Self::OrderLeft => "roomshare.order.left",
            Self::PasswordChanged => "roomshare.room.password.changed",
        }
    }

    /// Human-readable text for log rendering.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::RoomCreated => "The room was created.",
            Self::RoomChanged => "The room was changed.",
            Self::RoomDeleted => "The room was deleted.",
            Self::OrderJoined => "The order joined a room.",
            Self::OrderLeft => "The order left its room.",
            Self::PasswordChanged => "The room password was changed.",
        }
    }

    /// Looks an action up by its stored key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }
}

/// One structured audit log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier
    pub id: Uuid,
    /// When the mutation happened
    pub at: DateTime<Utc>,
    /// Who performed it
    pub actor: Actor,
    /// Event scope
    pub event: EventId,
    /// Order the entry is attached to, if any
    pub order: Option<OrderId>,
    /// Room the entry concerns, if any
    pub room: Option<RoomId>,
    /// Symbolic action
    pub action: AuditAction,
    /// Small JSON payload, e.g. `{"room": "<id>"}`
    pub data: Value,
}

impl AuditEntry {
    /// Creates an entry with a fresh id and empty payload.
    #[must_use]
    pub fn new(action: AuditAction, actor: Actor, event: EventId, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            at,
            actor,
            event,
            order: None,
            room: None,
            action,
            data: Value::Null,
        }
    }

    /// Attaches the entry to an order.
    #[must_use]
    pub const fn for_order(mut self, order: OrderId) -> Self {
        self.order = Some(order);
        self
    }

    /// Scopes the entry to a room and records the room id in the payload,
    /// so the reference survives the room's deletion.
    #[must_use]
    pub fn for_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self.data = serde_json::json!({ "room": room });
        self
    }
}
