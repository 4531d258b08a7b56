//! In-memory order directory and snapshot builders.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use roomshare_core::error::Result;
use roomshare_core::host::OrderDirectory;
use roomshare_core::types::{
    CartLine, CartSnapshot, EventId, EventRef, Money, OrderId, OrderSnapshot, OrderStatus,
    PositionSnapshot, ProductId, ProductRef, RefundSnapshot, RefundState, SubEventId, SubEventRef,
};

// ============================================================================
// Shorthand refs
// ============================================================================

/// A product reference with a fresh id.
#[must_use]
pub fn ticket(name: &str) -> ProductRef {
    ProductRef::new(ProductId::new(), name)
}

/// A sub-event reference with a fresh id.
#[must_use]
pub fn subevent(name: &str) -> SubEventRef {
    SubEventRef::new(SubEventId::new(), name)
}

// ============================================================================
// Directory fake
// ============================================================================

/// In-memory [`OrderDirectory`] for fast, deterministic tests.
///
/// # Example
///
/// ```
/// use roomshare_testing::{InMemoryOrderDirectory, OrderBuilder};
///
/// # async fn example() -> roomshare_core::error::Result<()> {
/// use roomshare_core::host::OrderDirectory;
///
/// let directory = InMemoryOrderDirectory::new();
/// let event = directory.add_event("megacorp", "con-2025", false);
/// directory.add_order(OrderBuilder::new(event.id, "AB1C2").paid().build());
///
/// let found = directory.order_by_code(event.id, "AB1C2").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryOrderDirectory {
    events: RwLock<HashMap<(String, String), EventRef>>,
    orders: RwLock<HashMap<OrderId, OrderSnapshot>>,
    products: RwLock<HashMap<EventId, Vec<ProductRef>>>,
}

impl InMemoryOrderDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event under its organizer/event slug pair and returns
    /// the reference.
    pub fn add_event(&self, organizer: &str, slug: &str, has_subevents: bool) -> EventRef {
        let event = EventRef {
            id: EventId::new(),
            organizer: organizer.to_owned(),
            slug: slug.to_owned(),
            has_subevents,
        };
        self.events
            .write()
            .unwrap()
            .insert((organizer.to_owned(), slug.to_owned()), event.clone());
        event
    }

    /// Adds (or replaces) an order snapshot.
    pub fn add_order(&self, order: OrderSnapshot) {
        self.orders.write().unwrap().insert(order.id, order);
    }

    /// Sets the product catalog of an event.
    pub fn set_products(&self, event: EventId, products: Vec<ProductRef>) {
        self.products.write().unwrap().insert(event, products);
    }
}

#[async_trait]
impl OrderDirectory for InMemoryOrderDirectory {
    async fn resolve_event(&self, organizer: &str, event: &str) -> Result<Option<EventRef>> {
        Ok(self
            .events
            .read()
            .unwrap()
            .get(&(organizer.to_owned(), event.to_owned()))
            .cloned())
    }

    async fn order(&self, event: EventId, order: OrderId) -> Result<Option<OrderSnapshot>> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .get(&order)
            .filter(|o| o.event == event)
            .cloned())
    }

    async fn order_by_code(&self, event: EventId, code: &str) -> Result<Option<OrderSnapshot>> {
        Ok(self
            .orders
            .read()
            .unwrap()
            .values()
            .find(|o| o.event == event && o.code == code)
            .cloned())
    }

    async fn orders_for_event(&self, event: EventId) -> Result<Vec<OrderSnapshot>> {
        let mut orders: Vec<_> = self
            .orders
            .read()
            .unwrap()
            .values()
            .filter(|o| o.event == event)
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(orders)
    }

    async fn products(&self, event: EventId) -> Result<Vec<ProductRef>> {
        Ok(self
            .products
            .read()
            .unwrap()
            .get(&event)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// Order builder
// ============================================================================

/// Fluent builder for [`OrderSnapshot`] fixtures.
///
/// Defaults: pending status, no approval requirement, secret
/// `"secret-<code>"`, total 23.00, no display name, no positions, no
/// refunds.
#[derive(Debug)]
pub struct OrderBuilder {
    order: OrderSnapshot,
}

impl OrderBuilder {
    /// Starts a builder for an order of the event with the given code.
    #[must_use]
    pub fn new(event: EventId, code: &str) -> Self {
        Self {
            order: OrderSnapshot {
                id: OrderId::new(),
                code: code.to_owned(),
                event,
                status: OrderStatus::Pending,
                requires_approval: false,
                secret: format!("secret-{code}"),
                total: Money::from_cents(2300),
                display_name: None,
                positions: Vec::new(),
                refunds: Vec::new(),
            },
        }
    }

    /// Sets the status to paid.
    #[must_use]
    pub fn paid(mut self) -> Self {
        self.order.status = OrderStatus::Paid;
        self
    }

    /// Sets the status to canceled.
    #[must_use]
    pub fn canceled(mut self) -> Self {
        self.order.status = OrderStatus::Canceled;
        self
    }

    /// Sets the status to expired.
    #[must_use]
    pub fn expired(mut self) -> Self {
        self.order.status = OrderStatus::Expired;
        self
    }

    /// Marks the order as awaiting (or denied) staff approval.
    #[must_use]
    pub fn requires_approval(mut self) -> Self {
        self.order.requires_approval = true;
        self
    }

    /// Overrides the self-service secret.
    #[must_use]
    pub fn secret(mut self, secret: &str) -> Self {
        self.order.secret = secret.to_owned();
        self
    }

    /// Overrides the order total, in cents.
    #[must_use]
    pub fn total(mut self, cents: u64) -> Self {
        self.order.total = Money::from_cents(cents);
        self
    }

    /// Sets the resolved buyer display name.
    #[must_use]
    pub fn display_name(mut self, name: &str) -> Self {
        self.order.display_name = Some(name.to_owned());
        self
    }

    /// Adds an admission position.
    #[must_use]
    pub fn admission(mut self, product: ProductRef, subevent: Option<SubEventRef>) -> Self {
        self.order.positions.push(PositionSnapshot {
            product,
            subevent,
            is_admission: true,
            canceled: false,
        });
        self
    }

    /// Adds a non-admission position (add-ons, merchandise).
    #[must_use]
    pub fn merchandise(mut self, product: ProductRef, subevent: Option<SubEventRef>) -> Self {
        self.order.positions.push(PositionSnapshot {
            product,
            subevent,
            is_admission: false,
            canceled: false,
        });
        self
    }

    /// Adds a position that was canceled out of the order.
    #[must_use]
    pub fn canceled_position(mut self, product: ProductRef, subevent: Option<SubEventRef>) -> Self {
        self.order.positions.push(PositionSnapshot {
            product,
            subevent,
            is_admission: true,
            canceled: true,
        });
        self
    }

    /// Records a refund in the given state.
    #[must_use]
    pub fn refund(mut self, state: RefundState) -> Self {
        self.order.refunds.push(RefundSnapshot { state });
        self
    }

    /// Finishes the snapshot.
    #[must_use]
    pub fn build(self) -> OrderSnapshot {
        self.order
    }
}

// ============================================================================
// Cart builder
// ============================================================================

/// Fluent builder for [`CartSnapshot`] fixtures.
///
/// `has_subevents` is derived: explicit via [`CartBuilder::with_subevents`]
/// or implied by any line carrying a sub-event.
#[derive(Debug)]
pub struct CartBuilder {
    event: EventId,
    has_subevents: bool,
    lines: Vec<CartLine>,
}

impl CartBuilder {
    /// Starts a builder for a cart in the event.
    #[must_use]
    pub const fn new(event: EventId) -> Self {
        Self {
            event,
            has_subevents: false,
            lines: Vec::new(),
        }
    }

    /// Marks the event as running sub-events even if no line names one.
    #[must_use]
    pub const fn with_subevents(mut self) -> Self {
        self.has_subevents = true;
        self
    }

    /// Adds a cart line.
    #[must_use]
    pub fn line(mut self, product: ProductRef, subevent: Option<SubEventRef>) -> Self {
        self.lines.push(CartLine { product, subevent });
        self
    }

    /// Finishes the snapshot.
    #[must_use]
    pub fn build(self) -> CartSnapshot {
        let has_subevents =
            self.has_subevents || self.lines.iter().any(|line| line.subevent.is_some());
        CartSnapshot {
            event: self.event,
            has_subevents,
            lines: self.lines,
        }
    }
}
