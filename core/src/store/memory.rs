//! In-memory room store.
//!
//! One `RwLock` guards the whole state, so every mutating call (change plus
//! its audit entries) is atomic by construction. Suitable for tests and for
//! hosts embedding the engine in a single process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::audit::AuditEntry;
use crate::error::{Result, RoomError};
use crate::store::RoomStore;
use crate::types::{EventId, Membership, OrderId, Room, RoomId};

#[derive(Default)]
struct State {
    rooms: HashMap<RoomId, Room>,
    /// `(event, name)` uniqueness index.
    names: HashMap<(EventId, String), RoomId>,
    memberships: HashMap<OrderId, Membership>,
    audit: Vec<AuditEntry>,
}

/// Room store backed by process memory.
#[derive(Default)]
pub struct InMemoryRoomStore {
    inner: RwLock<State>,
}

impl InMemoryRoomStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for InMemoryRoomStore {
    async fn room(&self, event: EventId, room: RoomId) -> Result<Option<Room>> {
        let state = self.inner.read().await;
        Ok(state.rooms.get(&room).filter(|r| r.event == event).cloned())
    }

    async fn room_by_name(&self, event: EventId, name: &str) -> Result<Option<Room>> {
        let state = self.inner.read().await;
        Ok(state
            .names
            .get(&(event, name.to_owned()))
            .and_then(|id| state.rooms.get(id))
            .cloned())
    }

    async fn rooms(&self, event: EventId) -> Result<Vec<Room>> {
        let state = self.inner.read().await;
        let mut rooms: Vec<Room> = state
            .rooms
            .values()
            .filter(|r| r.event == event)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rooms)
    }

    async fn membership(&self, order: OrderId) -> Result<Option<Membership>> {
        let state = self.inner.read().await;
        Ok(state.memberships.get(&order).copied())
    }

    async fn memberships_for_room(&self, room: RoomId) -> Result<Vec<Membership>> {
        let state = self.inner.read().await;
        let mut members: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.room == room)
            .copied()
            .collect();
        members.sort_by_key(|m| m.order);
        Ok(members)
    }

    async fn room_index(&self, event: EventId) -> Result<HashMap<OrderId, RoomId>> {
        let state = self.inner.read().await;
        Ok(state
            .memberships
            .values()
            .filter(|m| {
                state
                    .rooms
                    .get(&m.room)
                    .is_some_and(|r| r.event == event)
            })
            .map(|m| (m.order, m.room))
            .collect())
    }

    async fn audit_log(&self, order: OrderId) -> Result<Vec<AuditEntry>> {
        let state = self.inner.read().await;
        Ok(state
            .audit
            .iter()
            .filter(|e| e.order == Some(order))
            .cloned()
            .collect())
    }

    async fn insert_room(&self, room: &Room, audit: &[AuditEntry]) -> Result<()> {
        let mut state = self.inner.write().await;
        let key = (room.event, room.name.clone());
        if state.names.contains_key(&key) {
            return Err(RoomError::DuplicateName);
        }
        state.names.insert(key, room.id);
        state.rooms.insert(room.id, room.clone());
        state.audit.extend_from_slice(audit);
        Ok(())
    }

    async fn update_room(&self, room: &Room, audit: &[AuditEntry]) -> Result<()> {
        let mut state = self.inner.write().await;
        let Some(current) = state.rooms.get(&room.id).cloned() else {
            return Err(RoomError::RoomNotFound);
        };
        let key = (room.event, room.name.clone());
        if state.names.get(&key).is_some_and(|id| *id != room.id) {
            return Err(RoomError::DuplicateName);
        }
        state.names.remove(&(current.event, current.name));
        state.names.insert(key, room.id);
        state.rooms.insert(room.id, room.clone());
        state.audit.extend_from_slice(audit);
        Ok(())
    }

    async fn delete_room(
        &self,
        event: EventId,
        room: RoomId,
        audit: &[AuditEntry],
    ) -> Result<Vec<Membership>> {
        let mut state = self.inner.write().await;
        let Some(existing) = state.rooms.get(&room) else {
            return Err(RoomError::RoomNotFound);
        };
        if existing.event != event {
            return Err(RoomError::RoomNotFound);
        }
        let name_key = (existing.event, existing.name.clone());
        state.names.remove(&name_key);
        state.rooms.remove(&room);
        let removed: Vec<Membership> = state
            .memberships
            .values()
            .filter(|m| m.room == room)
            .copied()
            .collect();
        for membership in &removed {
            state.memberships.remove(&membership.order);
        }
        state.audit.extend_from_slice(audit);
        Ok(removed)
    }

    async fn insert_membership(&self, membership: &Membership, audit: &[AuditEntry]) -> Result<()> {
        let mut state = self.inner.write().await;
        if !state.rooms.contains_key(&membership.room) {
            return Err(RoomError::RoomNotFound);
        }
        if state.memberships.contains_key(&membership.order) {
            return Err(RoomError::AlreadyInRoom);
        }
        state.memberships.insert(membership.order, *membership);
        state.audit.extend_from_slice(audit);
        Ok(())
    }

    async fn remove_membership(
        &self,
        order: OrderId,
        audit: &[AuditEntry],
    ) -> Result<Option<Membership>> {
        let mut state = self.inner.write().await;
        let removed = state.memberships.remove(&order);
        if removed.is_some() {
            state.audit.extend_from_slice(audit);
        }
        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audit::AuditAction;
    use crate::types::Actor;
    use chrono::Utc;

    fn room(event: EventId, name: &str) -> Room {
        Room::new(event, name, "$argon2id$test".into(), Utc::now())
    }

    fn entry(event: EventId, order: OrderId, room: RoomId) -> AuditEntry {
        AuditEntry::new(AuditAction::OrderJoined, Actor::System, event, Utc::now())
            .for_order(order)
            .for_room(room)
    }

    #[tokio::test]
    async fn name_is_unique_per_event_not_globally() {
        let store = InMemoryRoomStore::new();
        let (e1, e2) = (EventId::new(), EventId::new());
        store.insert_room(&room(e1, "Alpha"), &[]).await.unwrap();
        assert_eq!(
            store.insert_room(&room(e1, "Alpha"), &[]).await,
            Err(RoomError::DuplicateName)
        );
        store.insert_room(&room(e2, "Alpha"), &[]).await.unwrap();
    }

    #[tokio::test]
    async fn update_can_rename_but_not_steal_a_name() {
        let store = InMemoryRoomStore::new();
        let event = EventId::new();
        let mut alpha = room(event, "Alpha");
        let beta = room(event, "Beta");
        store.insert_room(&alpha, &[]).await.unwrap();
        store.insert_room(&beta, &[]).await.unwrap();

        alpha.name = "Gamma".into();
        store.update_room(&alpha, &[]).await.unwrap();
        assert!(store.room_by_name(event, "Alpha").await.unwrap().is_none());
        assert!(store.room_by_name(event, "Gamma").await.unwrap().is_some());

        alpha.name = "Beta".into();
        assert_eq!(
            store.update_room(&alpha, &[]).await,
            Err(RoomError::DuplicateName)
        );
    }

    #[tokio::test]
    async fn updating_without_renaming_does_not_collide_with_itself() {
        let store = InMemoryRoomStore::new();
        let event = EventId::new();
        let mut alpha = room(event, "Alpha");
        store.insert_room(&alpha, &[]).await.unwrap();
        alpha.password_hash = "$argon2id$other".into();
        store.update_room(&alpha, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn delete_cascades_memberships_and_keeps_audit() {
        let store = InMemoryRoomStore::new();
        let event = EventId::new();
        let alpha = room(event, "Alpha");
        store.insert_room(&alpha, &[]).await.unwrap();

        let orders = [OrderId::new(), OrderId::new(), OrderId::new()];
        for order in orders {
            store
                .insert_membership(&Membership::new(order, alpha.id, false), &[])
                .await
                .unwrap();
        }

        let audit: Vec<AuditEntry> = orders
            .iter()
            .map(|&o| entry(event, o, alpha.id))
            .collect();
        let removed = store.delete_room(event, alpha.id, &audit).await.unwrap();
        assert_eq!(removed.len(), 3);
        assert!(store.room(event, alpha.id).await.unwrap().is_none());
        for order in orders {
            assert!(store.membership(order).await.unwrap().is_none());
            assert_eq!(store.audit_log(order).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn one_membership_per_order() {
        let store = InMemoryRoomStore::new();
        let event = EventId::new();
        let alpha = room(event, "Alpha");
        let beta = room(event, "Beta");
        store.insert_room(&alpha, &[]).await.unwrap();
        store.insert_room(&beta, &[]).await.unwrap();

        let order = OrderId::new();
        store
            .insert_membership(&Membership::new(order, alpha.id, true), &[])
            .await
            .unwrap();
        assert_eq!(
            store
                .insert_membership(&Membership::new(order, beta.id, false), &[])
                .await,
            Err(RoomError::AlreadyInRoom)
        );
    }

    #[tokio::test]
    async fn membership_requires_an_existing_room() {
        let store = InMemoryRoomStore::new();
        assert_eq!(
            store
                .insert_membership(&Membership::new(OrderId::new(), RoomId::new(), false), &[])
                .await,
            Err(RoomError::RoomNotFound)
        );
    }

    #[tokio::test]
    async fn remove_membership_is_silent_when_absent() {
        let store = InMemoryRoomStore::new();
        assert_eq!(
            store.remove_membership(OrderId::new(), &[]).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn rooms_are_listed_in_name_order() {
        let store = InMemoryRoomStore::new();
        let event = EventId::new();
        for name in ["Charlie", "Alpha", "Beta"] {
            store.insert_room(&room(event, name), &[]).await.unwrap();
        }
        let names: Vec<String> = store
            .rooms(event)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Alpha", "Beta", "Charlie"]);
    }

    #[tokio::test]
    async fn room_index_is_scoped_to_the_event() {
        let store = InMemoryRoomStore::new();
        let (e1, e2) = (EventId::new(), EventId::new());
        let r1 = room(e1, "Alpha");
        let r2 = room(e2, "Alpha");
        store.insert_room(&r1, &[]).await.unwrap();
        store.insert_room(&r2, &[]).await.unwrap();
        let (o1, o2) = (OrderId::new(), OrderId::new());
        store
            .insert_membership(&Membership::new(o1, r1.id, true), &[])
            .await
            .unwrap();
        store
            .insert_membership(&Membership::new(o2, r2.id, true), &[])
            .await
            .unwrap();

        let index = store.room_index(e1).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&o1), Some(&r1.id));
    }
}
