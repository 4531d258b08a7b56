//! # Roomshare Projections
//!
//! Read-side statistics over rooms and orders. Nothing here mutates state:
//! the [`StatsEngine`] folds the host's orders and the room membership index
//! into one [`StatsSnapshot`] per event, cross-tabulated by ticket category,
//! product and sub-event, and split by room membership where that is
//! meaningful.
//!
//! ## Modules
//!
//! - [`categories`]: The ticket categories and their membership rules.
//! - [`stats`]: The snapshot engine and its data model.
//! - [`exposition`]: Prometheus text rendering of a snapshot.
//!
//! ## Example
//!
//! ```ignore
//! let engine = StatsEngine::new(directory, store);
//! let snapshot = engine.snapshot(event).await?;
//! let body = exposition::render_metrics(&snapshot);
//! ```

pub mod categories;
pub mod exposition;
pub mod stats;

pub use categories::TicketCategory;
pub use exposition::{METRICS_CONTENT_TYPE, render_metrics};
pub use stats::{CategoryStats, RoomStats, StatsEngine, StatsSnapshot};
