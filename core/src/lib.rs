//! # Roomshare Core
//!
//! Room-sharing engine for ticketing checkouts.
//!
//! Attendees of an event can share rooms: during checkout they create a
//! named, password-protected room, join an existing one by name and
//! password, or opt out. This crate owns rooms, memberships, checkout
//! intent, placement materialization, the audit trail, and the operational
//! counters; the host platform stays in charge of orders, carts, catalog,
//! permissions, and sessions, and plugs in through the traits in [`host`].
//!
//! ## Core Concepts
//!
//! - **Room**: named, password-gated group of orders, unique per event
//! - **Membership**: one order in one room, with an admin flag
//! - **`CartRoomState`**: per-cart intent held in the host's session
//! - **`RoomIntent`**: intent frozen into order metadata at confirmation
//! - **Materializer**: converts frozen intent into memberships at placement
//! - **Audit**: every mutation commits with structured audit entries
//!
//! ## Wiring
//!
//! Hosts build the components over one shared [`RoomStore`] and register
//! the lifecycle hooks:
//!
//! ```ignore
//! use std::sync::Arc;
//! use roomshare_core::{
//!     InMemoryRoomStore, LifecycleHooks, MembershipLedger, OrderMaterializer,
//!     RoomRegistry, RoomStep, SystemClock,
//! };
//!
//! let store = Arc::new(InMemoryRoomStore::new());
//! let clock = Arc::new(SystemClock);
//! let registry = Arc::new(RoomRegistry::new(store.clone(), gate.clone(), clock.clone()));
//! let ledger = MembershipLedger::new(store.clone(), directory.clone(), gate, clock.clone());
//! let step = Arc::new(RoomStep::new(registry.clone(), store.clone(), directory));
//! let materializer = Arc::new(OrderMaterializer::new(store, clock));
//! let hooks = LifecycleHooks::standard(step, materializer);
//! // checkout: step.submit(...) / step.is_complete(...)
//! // confirmation: hooks.meta.order_meta(&state) into order metadata
//! // placement: hooks.placed.order_placed(event, order, intent)
//! ```

pub mod audit;
pub mod checkout;
pub mod error;
pub mod hooks;
pub mod host;
pub mod ledger;
pub mod materializer;
pub mod metrics;
pub mod password;
pub mod registry;
pub mod store;
pub mod types;

// Re-export the working set so hosts rarely need the module paths.
pub use audit::{AuditAction, AuditEntry};
pub use checkout::{
    CartRoomState, RoomMode, RoomStep, RoomStepForm, RoomStepInput, StepCompletion, StepWarning,
};
pub use error::{Result, RoomError};
pub use hooks::{LifecycleHooks, OnCheckoutConfirm, OnOrderMetaRequested, OnOrderPlaced};
pub use host::{
    Clock, OrderDirectory, PermissionGate, RoomshareSettings, SettingsStore, SystemClock,
};
pub use ledger::{LeaveOutcome, MembershipLedger, PasswordChangeOutcome};
pub use materializer::{MaterializeOutcome, OrderMaterializer, RoomIntent};
pub use registry::RoomRegistry;
pub use store::RoomStore;
pub use store::memory::InMemoryRoomStore;
#[cfg(feature = "postgres")]
pub use store::postgres::PostgresRoomStore;
pub use types::{
    Actor, CartLine, CartSnapshot, EventId, EventRef, Membership, Money, OrderId, OrderSnapshot,
    OrderStatus, PositionSnapshot, ProductId, ProductRef, QuestionId, RefundSnapshot, RefundState,
    Room, RoomId, SubEventId, SubEventRef,
};
