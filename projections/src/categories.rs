//! Ticket-count categories.
//!
//! Each category is a predicate over an order snapshot; the counting unit
//! everywhere is the non-canceled position (one ticket). Categories flagged
//! with [`TicketCategory::tracks_rooms`] additionally split their counts by
//! room membership and count distinct rooms.

use roomshare_core::types::OrderSnapshot;
use serde::{Deserialize, Serialize};

/// The fixed set of reported ticket categories.
///
/// Orders awaiting staff approval sit in pending status with
/// `requires_approval` set, which is why `total` and `pending` differ and
/// why `denied` looks at canceled approval orders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    /// Pending orders, whether or not they still await approval.
    Total,
    /// Orders past approval (or never needing it), pending or paid.
    Approved,
    /// Paid orders.
    Paid,
    /// Pending orders not awaiting approval.
    Pending,
    /// Canceled orders.
    Canceled,
    /// Canceled orders that actually got money back.
    CanceledRefunded,
    /// Approval orders that were denied (approval required and canceled).
    Denied,
}

impl TicketCategory {
    /// Every category, in reporting order.
    pub const ALL: [Self; 7] = [
        Self::Total,
        Self::Approved,
        Self::Paid,
        Self::Pending,
        Self::Canceled,
        Self::CanceledRefunded,
        Self::Denied,
    ];

    /// Stable key used in dashboard JSON and metric names.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Canceled => "canceled",
            Self::CanceledRefunded => "canceled_refunded",
            Self::Denied => "denied",
        }
    }

    /// Whether the category carries the room cross-tab and distinct-room
    /// counts.
    #[must_use]
    pub const fn tracks_rooms(&self) -> bool {
        matches!(
            self,
            Self::Total | Self::Approved | Self::Paid | Self::Pending
        )
    }

    /// Whether the order belongs to this category.
    #[must_use]
    pub fn includes(&self, order: &OrderSnapshot) -> bool {
        use roomshare_core::types::OrderStatus::{Canceled, Paid, Pending};
        match self {
            Self::Total => order.status == Pending,
            Self::Approved => !order.requires_approval && order.is_live(),
            Self::Paid => order.status == Paid,
            Self::Pending => order.status == Pending && !order.requires_approval,
            Self::Canceled => order.status == Canceled,
            Self::CanceledRefunded => {
                order.status == Canceled && order.has_completed_refund() && !order.total.is_zero()
            }
            Self::Denied => order.requires_approval && order.status == Canceled,
        }
    }
}
