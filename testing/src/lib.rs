//! # Roomshare Testing
//!
//! In-memory host fakes and fixture builders for testing the roomshare
//! engine without a real ticketing platform behind it.
//!
//! This crate provides:
//! - [`FixedClock`] / [`test_clock`]: deterministic time
//! - [`InMemoryOrderDirectory`] with [`OrderBuilder`] / [`CartBuilder`]
//! - [`StaticGate`]: canned permission answers
//! - [`InMemorySettingsStore`]: per-event settings in a map
//!
//! ## Example
//!
//! ```ignore
//! use roomshare_testing::{test_clock, InMemoryOrderDirectory, OrderBuilder, StaticGate, ticket};
//!
//! let directory = Arc::new(InMemoryOrderDirectory::new());
//! let event = directory.add_event("megacorp", "con-2025", false);
//! directory.add_order(
//!     OrderBuilder::new(event.id, "AB1C2")
//!         .paid()
//!         .admission(ticket("Weekend Pass"), None)
//!         .build(),
//! );
//! let registry = RoomRegistry::new(store, Arc::new(StaticGate::allow_all()), Arc::new(test_clock()));
//! ```

pub mod clock;
pub mod gates;
pub mod orders;
pub mod settings;

pub use clock::{FixedClock, test_clock};
pub use gates::StaticGate;
pub use orders::{CartBuilder, InMemoryOrderDirectory, OrderBuilder, subevent, ticket};
pub use settings::InMemorySettingsStore;
