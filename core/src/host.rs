//! Host platform collaborators.
//!
//! Everything the engine needs from the embedding ticketing platform is
//! expressed as a trait here: time, the order/catalog directory, the
//! per-event settings store, and the permission predicates guarding staff
//! operations. Hosts implement these against their own storage; the
//! `roomshare-testing` crate ships in-memory fakes.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{
    Actor, CartSnapshot, EventId, EventRef, OrderId, OrderSnapshot, ProductId, ProductRef,
    QuestionId,
};

// ============================================================================
// Clock
// ============================================================================

/// Source of the current time, injectable so tests can pin it.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock reading the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// Order directory
// ============================================================================

/// Read access to the host's orders and catalog.
///
/// The engine never writes through this trait; orders stay host-owned.
#[async_trait]
pub trait OrderDirectory: Send + Sync {
    /// Resolves an organizer/event slug pair to an event.
    async fn resolve_event(&self, organizer: &str, event: &str) -> Result<Option<EventRef>>;

    /// Fetches one order of the event by id.
    async fn order(&self, event: EventId, order: OrderId) -> Result<Option<OrderSnapshot>>;

    /// Fetches one order of the event by its human-facing code.
    async fn order_by_code(&self, event: EventId, code: &str) -> Result<Option<OrderSnapshot>>;

    /// Fetches all orders of the event, for aggregation.
    async fn orders_for_event(&self, event: EventId) -> Result<Vec<OrderSnapshot>>;

    /// Lists the products the event sells, for settings choices.
    async fn products(&self, event: EventId) -> Result<Vec<ProductRef>>;
}

// ============================================================================
// Settings
// ============================================================================

/// Per-event room-sharing configuration, persisted by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomshareSettings {
    /// Products whose presence in a cart makes the checkout step apply.
    /// An empty set means every product participates.
    #[serde(default)]
    pub eligible_products: BTreeSet<ProductId>,
    /// Host question whose answer supplies member display names, if any.
    #[serde(default)]
    pub name_question: Option<QuestionId>,
}

impl RoomshareSettings {
    /// Whether the room step applies to the given cart.
    #[must_use]
    pub fn applies_to_cart(&self, cart: &CartSnapshot) -> bool {
        self.eligible_products.is_empty()
            || cart
                .lines
                .iter()
                .any(|line| self.eligible_products.contains(&line.product.id))
    }
}

/// Load/store of [`RoomshareSettings`] in the host's settings storage.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Loads the settings for an event, falling back to defaults.
    async fn settings(&self, event: EventId) -> Result<RoomshareSettings>;

    /// Replaces the settings for an event.
    async fn update_settings(&self, event: EventId, settings: RoomshareSettings) -> Result<()>;
}

// ============================================================================
// Permissions
// ============================================================================

/// Host-supplied permission predicates for staff operations.
///
/// The engine only asks; granting is entirely the host's business.
pub trait PermissionGate: Send + Sync {
    /// May the actor view orders and rooms of this event?
    fn can_view_orders(&self, actor: &Actor, event: EventId) -> bool;

    /// May the actor change orders (delete rooms, reassign memberships)?
    fn can_change_orders(&self, actor: &Actor, event: EventId) -> bool;

    /// May the actor change the event's room-sharing settings?
    fn can_change_settings(&self, actor: &Actor, event: EventId) -> bool;
}
