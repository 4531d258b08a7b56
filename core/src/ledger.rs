//! Membership ledger: which order sleeps in which room.
//!
//! Every mutation writes its audit entries through the store so they commit
//! with the change. Leaving a room you are not in and changing a password
//! without the admin flag are deliberate no-ops surfaced as outcome
//! variants, never errors; forms render nothing and carry on.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::audit::{AuditAction, AuditEntry};
use crate::error::{Result, RoomError};
use crate::host::{Clock, OrderDirectory, PermissionGate};
use crate::metrics;
use crate::password;
use crate::store::RoomStore;
use crate::types::{Actor, EventId, Membership, OrderId, OrderSnapshot, RoomId};

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a leave request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The membership was removed.
    Left {
        /// Room the order used to belong to.
        room: RoomId,
    },
    /// The order had no membership; nothing happened.
    NotInRoom,
}

/// Result of a password-change request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordChangeOutcome {
    /// The room's password hash was replaced.
    Changed,
    /// The order is a plain member, not the room admin; nothing happened.
    NotAdmin,
    /// The order has no membership; nothing happened.
    NotInRoom,
}

// ============================================================================
// Ledger
// ============================================================================

/// Links orders to rooms and keeps the link honest.
pub struct MembershipLedger {
    store: Arc<dyn RoomStore>,
    directory: Arc<dyn OrderDirectory>,
    gate: Arc<dyn PermissionGate>,
    clock: Arc<dyn Clock>,
}

impl MembershipLedger {
    /// Creates a ledger over the given store and host collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn RoomStore>,
        directory: Arc<dyn OrderDirectory>,
        gate: Arc<dyn PermissionGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            gate,
            clock,
        }
    }

    /// Puts an order into a room.
    ///
    /// Password verification happens before this call (checkout step or
    /// order-modification form); staff reassignment skips it entirely.
    ///
    /// # Errors
    ///
    /// [`RoomError::AlreadyInRoom`] if the order already has a membership,
    /// [`RoomError::RoomNotFound`] if the room vanished.
    pub async fn join(
        &self,
        event: EventId,
        room: RoomId,
        order: OrderId,
        is_admin: bool,
        actor: &Actor,
    ) -> Result<Membership> {
        let membership = Membership::new(order, room, is_admin);
        let entry = AuditEntry::new(AuditAction::OrderJoined, actor.clone(), event, self.clock.now())
            .for_order(order)
            .for_room(room);
        self.store
            .insert_membership(&membership, std::slice::from_ref(&entry))
            .await?;
        metrics::record_join();
        tracing::debug!(order = %order, room = %room, is_admin, "order joined room");
        Ok(membership)
    }

    /// Takes an order out of its room, if it has one.
    ///
    /// # Errors
    ///
    /// Only [`RoomError::Storage`]; a missing membership is
    /// [`LeaveOutcome::NotInRoom`], not an error.
    pub async fn leave(
        &self,
        event: EventId,
        order: OrderId,
        actor: &Actor,
    ) -> Result<LeaveOutcome> {
        let Some(current) = self.store.membership(order).await? else {
            return Ok(LeaveOutcome::NotInRoom);
        };
        let entry = AuditEntry::new(AuditAction::OrderLeft, actor.clone(), event, self.clock.now())
            .for_order(order)
            .for_room(current.room);
        match self
            .store
            .remove_membership(order, std::slice::from_ref(&entry))
            .await?
        {
            Some(removed) => {
                metrics::record_leave();
                tracing::debug!(order = %order, room = %removed.room, "order left room");
                Ok(LeaveOutcome::Left { room: removed.room })
            }
            None => Ok(LeaveOutcome::NotInRoom),
        }
    }

    /// Replaces the room password, admin only.
    ///
    /// A non-admin member (or an order without a room) gets a no-op outcome.
    ///
    /// # Errors
    ///
    /// Validation errors for the new password surface as form errors
    /// ([`RoomError::MissingField`], [`RoomError::PasswordTooShort`]);
    /// [`RoomError::RoomNotFound`] if the membership points at a room the
    /// store no longer has.
    pub async fn change_password(
        &self,
        event: EventId,
        order: OrderId,
        new_password: &str,
        actor: &Actor,
    ) -> Result<PasswordChangeOutcome> {
        let Some(current) = self.store.membership(order).await? else {
            return Ok(PasswordChangeOutcome::NotInRoom);
        };
        if !current.is_admin {
            tracing::debug!(order = %order, room = %current.room, "password change ignored, not admin");
            return Ok(PasswordChangeOutcome::NotAdmin);
        }
        let new_password = new_password.trim();
        password::validate_password(new_password)?;

        let mut room = self
            .store
            .room(event, current.room)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        room.password_hash = password::hash_password(new_password)?;
        let entry = AuditEntry::new(
            AuditAction::PasswordChanged,
            actor.clone(),
            event,
            self.clock.now(),
        )
        .for_order(order)
        .for_room(room.id);
        self.store
            .update_room(&room, std::slice::from_ref(&entry))
            .await?;
        metrics::record_password_change();
        tracing::info!(order = %order, room = %room.id, "room password changed");
        Ok(PasswordChangeOutcome::Changed)
    }

    /// The order's membership, if any.
    ///
    /// # Errors
    ///
    /// Only [`RoomError::Storage`].
    pub async fn membership(&self, order: OrderId) -> Result<Option<Membership>> {
        self.store.membership(order).await
    }

    /// Other orders sharing the order's room: live (pending or paid) orders
    /// with at least one non-canceled admission position, excluding the
    /// order itself. Empty when the order has no room.
    ///
    /// # Errors
    ///
    /// [`RoomError::Storage`] from the store or the order directory.
    pub async fn fellow_members(
        &self,
        event: EventId,
        order: OrderId,
    ) -> Result<Vec<OrderSnapshot>> {
        let Some(current) = self.store.membership(order).await? else {
            return Ok(Vec::new());
        };
        let members = self.store.memberships_for_room(current.room).await?;
        let lookups = members
            .iter()
            .filter(|m| m.order != order)
            .map(|m| self.directory.order(event, m.order));
        let fellows = try_join_all(lookups)
            .await?
            .into_iter()
            .flatten()
            .filter(|o| o.is_live() && o.has_admission())
            .collect();
        Ok(fellows)
    }

    /// Staff reassignment: moves the order into `target` (or out of any
    /// room when `target` is `None`) without password verification.
    ///
    /// Returns the resulting membership, `None` when cleared.
    ///
    /// # Errors
    ///
    /// [`RoomError::PermissionDenied`] unless the actor may change orders,
    /// [`RoomError::RoomNotFound`] if the target room is not in the event.
    pub async fn assign(
        &self,
        event: EventId,
        order: OrderId,
        target: Option<(RoomId, bool)>,
        actor: &Actor,
    ) -> Result<Option<Membership>> {
        if !self.gate.can_change_orders(actor, event) {
            return Err(RoomError::PermissionDenied);
        }
        // Resolve the target before touching the current membership so a
        // bad room id leaves the order where it was.
        if let Some((room, _)) = target {
            self.store
                .room(event, room)
                .await?
                .ok_or(RoomError::RoomNotFound)?;
        }
        let now = self.clock.now();
        if let Some(current) = self.store.membership(order).await? {
            if let Some((room, is_admin)) = target {
                if room == current.room {
                    // Same room; only the admin flag may change.
                    if is_admin == current.is_admin {
                        return Ok(Some(current));
                    }
                    self.store.remove_membership(order, &[]).await?;
                    let membership = Membership::new(order, room, is_admin);
                    let entry =
                        AuditEntry::new(AuditAction::OrderJoined, actor.clone(), event, now)
                            .for_order(order)
                            .for_room(room);
                    self.store
                        .insert_membership(&membership, std::slice::from_ref(&entry))
                        .await?;
                    return Ok(Some(membership));
                }
            }
            let entry = AuditEntry::new(AuditAction::OrderLeft, actor.clone(), event, now)
                .for_order(order)
                .for_room(current.room);
            self.store
                .remove_membership(order, std::slice::from_ref(&entry))
                .await?;
            metrics::record_leave();
        }
        match target {
            Some((room, is_admin)) => {
                let membership = self.join(event, room, order, is_admin, actor).await?;
                Ok(Some(membership))
            }
            None => Ok(None),
        }
    }
}
