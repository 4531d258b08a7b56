//! The stats snapshot: orders × rooms folded into category cross-tabs.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use roomshare_core::error::Result;
use roomshare_core::host::OrderDirectory;
use roomshare_core::store::RoomStore;
use roomshare_core::types::{EventId, RoomId};
use serde::Serialize;

use crate::categories::TicketCategory;

/// Room cross-tab of one category.
///
/// Sub-events are keyed by display name, with `""` standing in when the
/// event has none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoomStats {
    /// product → sub-event → tickets on orders that have a room
    pub with_room: BTreeMap<String, BTreeMap<String, u64>>,
    /// product → sub-event → distinct rooms among those orders
    pub unique_rooms: BTreeMap<String, BTreeMap<String, u64>>,
    /// sub-event → tickets with a room
    pub subevent_with_room: BTreeMap<String, u64>,
    /// sub-event → tickets without a room
    pub subevent_without_room: BTreeMap<String, u64>,
    /// sub-event → distinct rooms
    pub subevent_unique_rooms: BTreeMap<String, u64>,
}

/// One category's counts, cross-tabulated both ways for the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    /// Tickets (non-canceled positions) in the category.
    pub tickets: u64,
    /// product → sub-event → tickets
    pub by_product: BTreeMap<String, BTreeMap<String, u64>>,
    /// sub-event → product → tickets
    pub by_subevent: BTreeMap<String, BTreeMap<String, u64>>,
    /// Room cross-tab, present for categories that track rooms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<RoomStats>,
}

/// The full per-event statistics snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Event the snapshot was computed for.
    pub event: EventId,
    /// Counts per category; every category is present, possibly empty.
    pub categories: BTreeMap<TicketCategory, CategoryStats>,
}

impl StatsSnapshot {
    /// The counts of one category.
    #[must_use]
    pub fn category(&self, category: TicketCategory) -> Option<&CategoryStats> {
        self.categories.get(&category)
    }
}

// Fold state: like CategoryStats but with room id sets instead of counts.
#[derive(Default)]
struct CategoryFold {
    tracks_rooms: bool,
    tickets: u64,
    by_product: BTreeMap<String, BTreeMap<String, u64>>,
    by_subevent: BTreeMap<String, BTreeMap<String, u64>>,
    with_room: BTreeMap<String, BTreeMap<String, u64>>,
    cell_rooms: BTreeMap<(String, String), BTreeSet<RoomId>>,
    subevent_with_room: BTreeMap<String, u64>,
    subevent_without_room: BTreeMap<String, u64>,
    subevent_rooms: BTreeMap<String, BTreeSet<RoomId>>,
}

impl CategoryFold {
    fn new(tracks_rooms: bool) -> Self {
        Self {
            tracks_rooms,
            ..Self::default()
        }
    }

    fn add(&mut self, product: &str, subevent: &str, room: Option<RoomId>) {
        self.tickets += 1;
        *self
            .by_product
            .entry(product.to_owned())
            .or_default()
            .entry(subevent.to_owned())
            .or_default() += 1;
        *self
            .by_subevent
            .entry(subevent.to_owned())
            .or_default()
            .entry(product.to_owned())
            .or_default() += 1;
        if !self.tracks_rooms {
            return;
        }
        if let Some(room) = room {
            *self
                .with_room
                .entry(product.to_owned())
                .or_default()
                .entry(subevent.to_owned())
                .or_default() += 1;
            self.cell_rooms
                .entry((product.to_owned(), subevent.to_owned()))
                .or_default()
                .insert(room);
            *self.subevent_with_room.entry(subevent.to_owned()).or_default() += 1;
            self.subevent_rooms
                .entry(subevent.to_owned())
                .or_default()
                .insert(room);
        } else {
            *self
                .subevent_without_room
                .entry(subevent.to_owned())
                .or_default() += 1;
        }
    }

    fn finish(self) -> CategoryStats {
        let rooms = self.tracks_rooms.then(|| {
            let mut unique_rooms: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
            for ((product, subevent), rooms) in self.cell_rooms {
                unique_rooms
                    .entry(product)
                    .or_default()
                    .insert(subevent, rooms.len() as u64);
            }
            RoomStats {
                with_room: self.with_room,
                unique_rooms,
                subevent_with_room: self.subevent_with_room,
                subevent_without_room: self.subevent_without_room,
                subevent_unique_rooms: self
                    .subevent_rooms
                    .into_iter()
                    .map(|(subevent, rooms)| (subevent, rooms.len() as u64))
                    .collect(),
            }
        });
        CategoryStats {
            tickets: self.tickets,
            by_product: self.by_product,
            by_subevent: self.by_subevent,
            rooms,
        }
    }
}

/// Computes [`StatsSnapshot`]s from the order directory and the room store.
pub struct StatsEngine {
    directory: Arc<dyn OrderDirectory>,
    store: Arc<dyn RoomStore>,
}

impl StatsEngine {
    /// Creates an engine over the host directory and the room store.
    #[must_use]
    pub fn new(directory: Arc<dyn OrderDirectory>, store: Arc<dyn RoomStore>) -> Self {
        Self { directory, store }
    }

    /// Folds every order of the event into the category cross-tabs.
    ///
    /// Orders and the membership index are fetched concurrently; the fold
    /// itself is one pass over positions.
    ///
    /// # Errors
    ///
    /// [`roomshare_core::RoomError::Storage`] from either source.
    pub async fn snapshot(&self, event: EventId) -> Result<StatsSnapshot> {
        let (orders, room_index) = tokio::try_join!(
            self.directory.orders_for_event(event),
            self.store.room_index(event),
        )?;
        tracing::debug!(
            event = %event,
            orders = orders.len(),
            member_orders = room_index.len(),
            "computing stats snapshot"
        );

        let mut folds: BTreeMap<TicketCategory, CategoryFold> = TicketCategory::ALL
            .into_iter()
            .map(|c| (c, CategoryFold::new(c.tracks_rooms())))
            .collect();
        for order in &orders {
            let room = room_index.get(&order.id).copied();
            for category in TicketCategory::ALL {
                if !category.includes(order) {
                    continue;
                }
                let Some(fold) = folds.get_mut(&category) else {
                    continue;
                };
                for position in order.positions.iter().filter(|p| !p.canceled) {
                    let subevent = position.subevent.as_ref().map_or("", |s| s.name.as_str());
                    fold.add(&position.product.name, subevent, room);
                }
            }
        }

        Ok(StatsSnapshot {
            event,
            categories: folds.into_iter().map(|(c, f)| (c, f.finish())).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roomshare_core::store::memory::InMemoryRoomStore;
    use roomshare_core::types::Membership;
    use roomshare_testing::{InMemoryOrderDirectory, OrderBuilder, ticket};

    #[tokio::test]
    async fn empty_events_still_report_every_category() {
        let engine = StatsEngine::new(
            Arc::new(InMemoryOrderDirectory::new()),
            Arc::new(InMemoryRoomStore::new()),
        );
        let snapshot = engine.snapshot(EventId::new()).await.unwrap();
        assert_eq!(snapshot.categories.len(), TicketCategory::ALL.len());
        let total = snapshot.category(TicketCategory::Total).unwrap();
        assert_eq!(total.tickets, 0);
        assert!(total.rooms.is_some());
        assert!(snapshot
            .category(TicketCategory::Canceled)
            .unwrap()
            .rooms
            .is_none());
    }

    #[tokio::test]
    async fn canceled_positions_do_not_count() {
        let directory = Arc::new(InMemoryOrderDirectory::new());
        let store = Arc::new(InMemoryRoomStore::new());
        let event = directory.add_event("megacorp", "con-2025", false).id;
        let pass = ticket("Weekend Pass");
        directory.add_order(
            OrderBuilder::new(event, "AB1C2")
                .paid()
                .admission(pass.clone(), None)
                .canceled_position(pass.clone(), None)
                .build(),
        );
        let snapshot = StatsEngine::new(directory, store)
            .snapshot(event)
            .await
            .unwrap();
        let paid = snapshot.category(TicketCategory::Paid).unwrap();
        assert_eq!(paid.tickets, 1);
        assert_eq!(paid.by_product["Weekend Pass"][""], 1);
    }

    #[tokio::test]
    async fn membership_splits_the_room_cross_tab() {
        use roomshare_core::password::hash_password;
        use roomshare_core::types::Room;

        let directory = Arc::new(InMemoryOrderDirectory::new());
        let store = Arc::new(InMemoryRoomStore::new());
        let event = directory.add_event("megacorp", "con-2025", false).id;
        let room = Room::new(
            event,
            "Alpha",
            hash_password("xyz123").unwrap(),
            chrono::Utc::now(),
        );
        store.insert_room(&room, &[]).await.unwrap();

        let housed = OrderBuilder::new(event, "HOUSE")
            .paid()
            .admission(ticket("Weekend Pass"), None)
            .build();
        store
            .insert_membership(&Membership::new(housed.id, room.id, true), &[])
            .await
            .unwrap();
        directory.add_order(housed);
        directory.add_order(
            OrderBuilder::new(event, "LONER")
                .paid()
                .admission(ticket("Weekend Pass"), None)
                .build(),
        );

        let snapshot = StatsEngine::new(directory, store)
            .snapshot(event)
            .await
            .unwrap();
        let rooms = snapshot
            .category(TicketCategory::Paid)
            .unwrap()
            .rooms
            .as_ref()
            .unwrap();
        assert_eq!(rooms.with_room["Weekend Pass"][""], 1);
        assert_eq!(rooms.subevent_with_room[""], 1);
        assert_eq!(rooms.subevent_without_room[""], 1);
        assert_eq!(rooms.subevent_unique_rooms[""], 1);
    }
}
