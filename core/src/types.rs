//! Domain types for the room-sharing engine.
//!
//! Value objects and entities: typed identifiers, the `Room` and
//! `Membership` records the engine owns, and the read-only snapshots
//! (`OrderSnapshot`, `CartSnapshot`) the host platform supplies through the
//! collaborator traits in [`crate::host`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Declares a `Copy` uuid newtype with the plumbing the stores, serializers
/// and log lines expect.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Mints a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps a `Uuid`, e.g. one read back from storage.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrows the wrapped `Uuid` for query binding.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

uuid_id! {
    /// A host platform event, the scope of every room and membership.
    EventId
}

uuid_id! {
    /// A room.
    RoomId
}

uuid_id! {
    /// A host order.
    OrderId
}

uuid_id! {
    /// An item sold by the event.
    ProductId
}

uuid_id! {
    /// One date of a recurring event series.
    SubEventId
}

uuid_id! {
    /// A host checkout question; settings reference one to resolve buyer
    /// display names.
    QuestionId
}

// ============================================================================
// Money
// ============================================================================

/// An amount in integer cents.
///
/// The engine never does arithmetic on totals; it only checks them against
/// zero when classifying refunds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// The zero amount
    pub const ZERO: Self = Self(0);

    /// Wraps an amount of cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// The amount in cents.
    #[must_use]
    pub const fn as_cents(&self) -> u64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Host catalog references
// ============================================================================

/// A product as the host catalog names it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    /// Product identifier
    pub id: ProductId,
    /// Display name shown in dashboards and metric labels
    pub name: String,
}

impl ProductRef {
    /// Creates a product reference
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A sub-event as the host catalog names it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEventRef {
    /// Sub-event identifier
    pub id: SubEventId,
    /// Display name shown in dashboards and metric labels
    pub name: String,
}

impl SubEventRef {
    /// Creates a sub-event reference
    #[must_use]
    pub fn new(id: SubEventId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// An event resolved from its organizer/event slug pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    /// Event identifier
    pub id: EventId,
    /// Organizer slug as it appears in URLs
    pub organizer: String,
    /// Event slug as it appears in URLs
    pub slug: String,
    /// Whether the event runs as a series of sub-events
    pub has_subevents: bool,
}

// ============================================================================
// Order snapshots (read-only views supplied by the host)
// ============================================================================

/// Lifecycle status of a host order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting payment (or approval)
    Pending,
    /// Paid in full
    Paid,
    /// Canceled, by the buyer or by staff
    Canceled,
    /// Expired before payment
    Expired,
}

impl OrderStatus {
    /// Stable lowercase name, used in logs and serialized payloads
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }

    /// Whether the order still counts as active business (pending or paid)
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a refund attached to an order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundState {
    /// Requested but not yet processed
    Created,
    /// Completed
    Done,
    /// Processing failed
    Failed,
}

/// A refund as seen on an order snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundSnapshot {
    /// Processing state of the refund
    pub state: RefundState,
}

/// One order line item as seen by the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Product this position was bought for
    pub product: ProductRef,
    /// Sub-event the position belongs to, if the event runs sub-events
    pub subevent: Option<SubEventRef>,
    /// Whether the product admits a person (vs. add-ons, merchandise)
    pub is_admission: bool,
    /// Whether this single position was canceled out of the order
    pub canceled: bool,
}

/// Read-only view of a host order.
///
/// The host resolves `display_name` from its configured display-name
/// question before handing the snapshot over; the engine never queries
/// question answers itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    /// Order identifier
    pub id: OrderId,
    /// Human-facing order code (e.g. `A1B2C`)
    pub code: String,
    /// Event the order belongs to
    pub event: EventId,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Whether the order still awaits (or was denied) staff approval
    pub requires_approval: bool,
    /// Per-order secret granting the buyer self-service access
    pub secret: String,
    /// Order total
    pub total: Money,
    /// Buyer display name, if the host resolved one
    pub display_name: Option<String>,
    /// Line items
    pub positions: Vec<PositionSnapshot>,
    /// Refunds recorded against the order
    pub refunds: Vec<RefundSnapshot>,
}

impl OrderSnapshot {
    /// Whether the order is in pending or paid status
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.status.is_live()
    }

    /// Whether the order has at least one non-canceled admission position
    #[must_use]
    pub fn has_admission(&self) -> bool {
        self.positions.iter().any(|p| p.is_admission && !p.canceled)
    }

    /// Whether at least one refund completed
    #[must_use]
    pub fn has_completed_refund(&self) -> bool {
        self.refunds.iter().any(|r| r.state == RefundState::Done)
    }

    /// Sub-event ids of all non-canceled positions (`None` entries for
    /// positions without a sub-event)
    #[must_use]
    pub fn subevents(&self) -> BTreeSet<Option<SubEventId>> {
        self.positions
            .iter()
            .filter(|p| !p.canceled)
            .map(|p| p.subevent.as_ref().map(|s| s.id))
            .collect()
    }
}

// ============================================================================
// Cart snapshots
// ============================================================================

/// One line in the current shopping cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product in the cart
    pub product: ProductRef,
    /// Sub-event the line belongs to, if any
    pub subevent: Option<SubEventRef>,
}

/// Read-only view of the shopping cart the checkout step is running for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Event being checked out
    pub event: EventId,
    /// Whether the event runs as a series of sub-events
    pub has_subevents: bool,
    /// Cart line items
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// Product ids present in the cart
    #[must_use]
    pub fn products(&self) -> BTreeSet<ProductId> {
        self.lines.iter().map(|l| l.product.id).collect()
    }

    /// Sub-event ids present in the cart (`None` for lines without one)
    #[must_use]
    pub fn subevents(&self) -> BTreeSet<Option<SubEventId>> {
        self.lines
            .iter()
            .map(|l| l.subevent.as_ref().map(|s| s.id))
            .collect()
    }
}

// ============================================================================
// Rooms and memberships
// ============================================================================

/// A named, password-gated group of orders scoped to one event.
///
/// Only the argon2 hash of the password is stored. The struct deliberately
/// does not implement `Serialize`; web-facing views copy the fields they
/// may expose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    /// Room identifier
    pub id: RoomId,
    /// Owning event; `(event, name)` is unique
    pub event: EventId,
    /// Room name, unique within the event
    pub name: String,
    /// Argon2 PHC-format hash of the room password
    pub password_hash: String,
    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Room {
    /// Creates a room record with a fresh id
    #[must_use]
    pub fn new(
        event: EventId,
        name: impl Into<String>,
        password_hash: String,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RoomId::new(),
            event,
            name: name.into(),
            password_hash,
            created,
        }
    }
}

/// Link between one order and one room
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// The order; an order has at most one membership
    pub order: OrderId,
    /// The room the order belongs to
    pub room: RoomId,
    /// Whether this member administers the room (may change its password)
    pub is_admin: bool,
}

impl Membership {
    /// Creates a membership record
    #[must_use]
    pub const fn new(order: OrderId, room: RoomId, is_admin: bool) -> Self {
        Self {
            order,
            room,
            is_admin,
        }
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Identity performing a mutation, recorded in audit entries and checked
/// against the host permission gate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Actor {
    /// Engine-internal action (e.g. the order-placement materializer)
    System,
    /// The buyer acting on their own order
    Order(OrderId),
    /// A staff user, identified by the host's user handle
    Staff(String),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Order(id) => write!(f, "order:{id}"),
            Self::Staff(user) => write!(f, "staff:{user}"),
        }
    }
}
