//! Room registry: create, edit, look up, and delete rooms.
//!
//! Creation goes through [`RoomRegistry::create_or_update`] so a checkout
//! resubmission edits the session's pending room in place instead of
//! leaving half-created copies behind. Deletion is staff-only and cascades
//! memberships, writing one audit entry per affected order atomically with
//! the cascade.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::audit::{AuditAction, AuditEntry};
use crate::error::{Result, RoomError};
use crate::host::{Clock, PermissionGate};
use crate::metrics;
use crate::password;
use crate::store::RoomStore;
use crate::types::{Actor, EventId, OrderId, Room, RoomId};

/// Manages uniquely-named, password-protected rooms scoped to an event.
pub struct RoomRegistry {
    store: Arc<dyn RoomStore>,
    gate: Arc<dyn PermissionGate>,
    clock: Arc<dyn Clock>,
}

impl RoomRegistry {
    /// Creates a registry over the given store and host collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn RoomStore>,
        gate: Arc<dyn PermissionGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, gate, clock }
    }

    /// Validates and persists a room, creating it or updating the room
    /// being edited in place.
    ///
    /// `editing` is the session's pending room (or the room a post-placement
    /// form is editing); its own name never trips the duplicate check. If
    /// the edited room vanished meanwhile, a fresh room is created instead.
    /// `audit_for` attaches a `room.created`/`room.changed` entry to an
    /// order when one exists; checkout staging passes `None` since no order
    /// exists yet.
    ///
    /// # Errors
    ///
    /// [`RoomError::MissingField`] for an empty name or password,
    /// [`RoomError::PasswordTooShort`] below the policy minimum,
    /// [`RoomError::DuplicateName`] when the name is taken within the event
    /// (also under a concurrent-create race, settled by the store).
    pub async fn create_or_update(
        &self,
        event: EventId,
        editing: Option<RoomId>,
        name: &str,
        password: &str,
        audit_for: Option<(OrderId, &Actor)>,
    ) -> Result<Room> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::MissingField { field: "name" });
        }
        let password = password.trim();
        password::validate_password(password)?;

        if let Some(existing) = self.store.room_by_name(event, name).await? {
            if editing != Some(existing.id) {
                return Err(RoomError::DuplicateName);
            }
        }

        let password_hash = password::hash_password(password)?;
        let now = self.clock.now();

        if let Some(id) = editing {
            if let Some(mut room) = self.store.room(event, id).await? {
                room.name = name.to_owned();
                room.password_hash = password_hash;
                let audit = audit_for.map(|(order, actor)| {
                    AuditEntry::new(AuditAction::RoomChanged, actor.clone(), event, now)
                        .for_order(order)
                        .for_room(room.id)
                });
                self.store
                    .update_room(&room, audit.as_slice())
                    .await?;
                tracing::debug!(room = %room.id, event = %event, "room updated in place");
                return Ok(room);
            }
            // The edited room vanished between submissions; create anew.
        }

        let room = Room::new(event, name, password_hash, now);
        let audit = audit_for.map(|(order, actor)| {
            AuditEntry::new(AuditAction::RoomCreated, actor.clone(), event, now)
                .for_order(order)
                .for_room(room.id)
        });
        self.store.insert_room(&room, audit.as_slice()).await?;
        metrics::record_room_created();
        tracing::info!(room = %room.id, event = %event, name = %room.name, "room created");
        Ok(room)
    }

    /// Looks a room up by its submitted (trimmed) name.
    ///
    /// # Errors
    ///
    /// [`RoomError::RoomNotFound`] if no room of the event has that name.
    pub async fn find_by_name(&self, event: EventId, name: &str) -> Result<Room> {
        self.store
            .room_by_name(event, name.trim())
            .await?
            .ok_or(RoomError::RoomNotFound)
    }

    /// Deletes a room, cascading its memberships. Returns how many
    /// memberships were removed.
    ///
    /// # Errors
    ///
    /// [`RoomError::PermissionDenied`] unless the actor may change orders,
    /// [`RoomError::RoomNotFound`] if the room does not exist in the event.
    pub async fn delete(&self, event: EventId, room: RoomId, actor: &Actor) -> Result<usize> {
        if !self.gate.can_change_orders(actor, event) {
            return Err(RoomError::PermissionDenied);
        }
        let existing = self
            .store
            .room(event, room)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        let members = self.store.memberships_for_room(room).await?;
        let now = self.clock.now();

        let mut audit: SmallVec<[AuditEntry; 4]> = members
            .iter()
            .map(|m| {
                AuditEntry::new(AuditAction::OrderLeft, actor.clone(), event, now)
                    .for_order(m.order)
                    .for_room(room)
            })
            .collect();
        audit.push(AuditEntry::new(AuditAction::RoomDeleted, actor.clone(), event, now).for_room(room));

        let removed = self.store.delete_room(event, room, audit.as_slice()).await?;
        metrics::record_room_deleted(removed.len() as u64);
        tracing::info!(
            room = %room,
            event = %event,
            name = %existing.name,
            members = removed.len(),
            "room deleted"
        );
        Ok(removed.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::host::SystemClock;
    use crate::store::memory::InMemoryRoomStore;
    use crate::types::Membership;
    use proptest::prelude::*;

    struct AllowAll;
    impl PermissionGate for AllowAll {
        fn can_view_orders(&self, _: &Actor, _: EventId) -> bool {
            true
        }
        fn can_change_orders(&self, _: &Actor, _: EventId) -> bool {
            true
        }
        fn can_change_settings(&self, _: &Actor, _: EventId) -> bool {
            true
        }
    }

    struct DenyAll;
    impl PermissionGate for DenyAll {
        fn can_view_orders(&self, _: &Actor, _: EventId) -> bool {
            false
        }
        fn can_change_orders(&self, _: &Actor, _: EventId) -> bool {
            false
        }
        fn can_change_settings(&self, _: &Actor, _: EventId) -> bool {
            false
        }
    }

    fn registry_with(gate: Arc<dyn PermissionGate>) -> (Arc<InMemoryRoomStore>, RoomRegistry) {
        let store = Arc::new(InMemoryRoomStore::new());
        let registry = RoomRegistry::new(store.clone(), gate, Arc::new(SystemClock));
        (store, registry)
    }

    fn registry() -> (Arc<InMemoryRoomStore>, RoomRegistry) {
        registry_with(Arc::new(AllowAll))
    }

    #[tokio::test]
    async fn create_validates_name_and_password() {
        let (_, registry) = registry();
        let event = EventId::new();
        assert_eq!(
            registry
                .create_or_update(event, None, "  ", "xyz123", None)
                .await,
            Err(RoomError::MissingField { field: "name" })
        );
        assert_eq!(
            registry
                .create_or_update(event, None, "Alpha", "", None)
                .await,
            Err(RoomError::MissingField { field: "password" })
        );
        assert_eq!(
            registry
                .create_or_update(event, None, "Alpha", "xy", None)
                .await,
            Err(RoomError::PasswordTooShort { min: 3 })
        );
    }

    #[tokio::test]
    async fn created_room_stores_a_verifiable_hash() {
        let (_, registry) = registry();
        let room = registry
            .create_or_update(EventId::new(), None, " Alpha ", "xyz123", None)
            .await
            .unwrap();
        assert_eq!(room.name, "Alpha");
        assert!(password::verify_password(&room.password_hash, "xyz123").unwrap());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_but_not_against_itself() {
        let (_, registry) = registry();
        let event = EventId::new();
        let alpha = registry
            .create_or_update(event, None, "Alpha", "xyz123", None)
            .await
            .unwrap();
        assert_eq!(
            registry
                .create_or_update(event, None, "Alpha", "other1", None)
                .await,
            Err(RoomError::DuplicateName)
        );
        // Resubmitting the same name for the room being edited is fine.
        let edited = registry
            .create_or_update(event, Some(alpha.id), "Alpha", "newpw1", None)
            .await
            .unwrap();
        assert_eq!(edited.id, alpha.id);
        assert!(password::verify_password(&edited.password_hash, "newpw1").unwrap());
    }

    #[tokio::test]
    async fn editing_a_vanished_room_creates_a_fresh_one() {
        let (_, registry) = registry();
        let event = EventId::new();
        let room = registry
            .create_or_update(event, Some(RoomId::new()), "Alpha", "xyz123", None)
            .await
            .unwrap();
        assert_eq!(
            registry.find_by_name(event, "Alpha").await.unwrap().id,
            room.id
        );
    }

    #[tokio::test]
    async fn find_by_name_trims_and_reports_missing_rooms() {
        let (_, registry) = registry();
        let event = EventId::new();
        registry
            .create_or_update(event, None, "Alpha", "xyz123", None)
            .await
            .unwrap();
        assert_eq!(
            registry.find_by_name(event, " Alpha ").await.unwrap().name,
            "Alpha"
        );
        assert_eq!(
            registry.find_by_name(event, "Beta").await,
            Err(RoomError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn delete_requires_staff_permission() {
        let (_, registry) = registry_with(Arc::new(DenyAll));
        assert_eq!(
            registry
                .delete(EventId::new(), RoomId::new(), &Actor::Staff("jo".into()))
                .await,
            Err(RoomError::PermissionDenied)
        );
    }

    #[tokio::test]
    async fn delete_cascades_and_audits_every_member_order() {
        let (store, registry) = registry();
        let event = EventId::new();
        let staff = Actor::Staff("jo".into());
        let room = registry
            .create_or_update(event, None, "Alpha", "xyz123", None)
            .await
            .unwrap();
        let orders = [OrderId::new(), OrderId::new()];
        for order in orders {
            store
                .insert_membership(&Membership::new(order, room.id, false), &[])
                .await
                .unwrap();
        }

        let removed = registry.delete(event, room.id, &staff).await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.room(event, room.id).await.unwrap().is_none());
        for order in orders {
            let log = store.audit_log(order).await.unwrap();
            assert_eq!(log.len(), 1);
            assert_eq!(log[0].action, AuditAction::OrderLeft);
            assert_eq!(log[0].data["room"], serde_json::json!(room.id));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn second_create_with_same_name_always_fails(
            name in "[A-Za-z][A-Za-z0-9 ]{0,23}",
        ) {
            tokio_test::block_on(async {
                let (_, registry) = registry();
                let event = EventId::new();
                registry
                    .create_or_update(event, None, &name, "xyz123", None)
                    .await
                    .unwrap();
                assert_eq!(
                    registry
                        .create_or_update(event, None, &name, "other1", None)
                        .await,
                    Err(RoomError::DuplicateName)
                );
            });
        }
    }
}
