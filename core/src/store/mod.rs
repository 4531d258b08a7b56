//! Room storage.
//!
//! The engine talks to rooms, memberships, and the audit log through the
//! [`RoomStore`] trait. Mutating calls take the audit entries describing
//! them; implementations must commit mutation and entries atomically (one
//! lock guard in memory, one transaction in Postgres), which is what keeps
//! the audit trail trustworthy under concurrent requests.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::audit::AuditEntry;
use crate::error::Result;
use crate::types::{EventId, Membership, OrderId, Room, RoomId};

/// Persistent storage for rooms, memberships, and audit entries.
#[async_trait]
pub trait RoomStore: Send + Sync {
    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetches a room of the event by id.
    async fn room(&self, event: EventId, room: RoomId) -> Result<Option<Room>>;

    /// Fetches a room of the event by exact name.
    async fn room_by_name(&self, event: EventId, name: &str) -> Result<Option<Room>>;

    /// All rooms of the event, ordered by name.
    async fn rooms(&self, event: EventId) -> Result<Vec<Room>>;

    /// The membership of an order, if any.
    async fn membership(&self, order: OrderId) -> Result<Option<Membership>>;

    /// All memberships of a room.
    async fn memberships_for_room(&self, room: RoomId) -> Result<Vec<Membership>>;

    /// Order → room index across the whole event, for aggregation.
    async fn room_index(&self, event: EventId) -> Result<HashMap<OrderId, RoomId>>;

    /// Audit entries attached to an order, oldest first.
    async fn audit_log(&self, order: OrderId) -> Result<Vec<AuditEntry>>;

    // ------------------------------------------------------------------
    // Mutations (the audit entries commit atomically with the change)
    // ------------------------------------------------------------------

    /// Inserts a new room.
    ///
    /// # Errors
    ///
    /// [`crate::error::RoomError::DuplicateName`] if `(event, name)` is
    /// already taken.
    async fn insert_room(&self, room: &Room, audit: &[AuditEntry]) -> Result<()>;

    /// Updates a room's name and password hash in place.
    ///
    /// # Errors
    ///
    /// [`crate::error::RoomError::RoomNotFound`] if the room does not
    /// exist, [`crate::error::RoomError::DuplicateName`] if the new name
    /// collides with another room of the event.
    async fn update_room(&self, room: &Room, audit: &[AuditEntry]) -> Result<()>;

    /// Deletes a room, cascading all of its memberships. Returns the
    /// memberships that were removed.
    ///
    /// # Errors
    ///
    /// [`crate::error::RoomError::RoomNotFound`] if the room does not
    /// exist in the event.
    async fn delete_room(
        &self,
        event: EventId,
        room: RoomId,
        audit: &[AuditEntry],
    ) -> Result<Vec<Membership>>;

    /// Inserts a membership.
    ///
    /// # Errors
    ///
    /// [`crate::error::RoomError::AlreadyInRoom`] if the order already has
    /// one, [`crate::error::RoomError::RoomNotFound`] if the room does not
    /// exist.
    async fn insert_membership(&self, membership: &Membership, audit: &[AuditEntry]) -> Result<()>;

    /// Removes an order's membership. Returns the removed membership, or
    /// `None` if there was nothing to remove (callers decide whether that
    /// is a no-op or a problem).
    async fn remove_membership(
        &self,
        order: OrderId,
        audit: &[AuditEntry],
    ) -> Result<Option<Membership>>;
}
