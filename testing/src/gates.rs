//! Canned permission gates.

use roomshare_core::host::PermissionGate;
use roomshare_core::types::{Actor, EventId};

/// Permission gate with fixed answers, independent of actor and event.
///
/// # Example
///
/// ```
/// use roomshare_testing::StaticGate;
/// use roomshare_core::host::PermissionGate;
/// use roomshare_core::types::{Actor, EventId};
///
/// let gate = StaticGate::read_only();
/// let event = EventId::new();
/// assert!(gate.can_view_orders(&Actor::System, event));
/// assert!(!gate.can_change_orders(&Actor::System, event));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct StaticGate {
    view_orders: bool,
    change_orders: bool,
    change_settings: bool,
}

impl StaticGate {
    /// Everything is permitted.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            view_orders: true,
            change_orders: true,
            change_settings: true,
        }
    }

    /// Nothing is permitted.
    #[must_use]
    pub const fn deny_all() -> Self {
        Self {
            view_orders: false,
            change_orders: false,
            change_settings: false,
        }
    }

    /// Viewing is permitted, changing anything is not.
    #[must_use]
    pub const fn read_only() -> Self {
        Self {
            view_orders: true,
            change_orders: false,
            change_settings: false,
        }
    }
}

impl PermissionGate for StaticGate {
    fn can_view_orders(&self, _actor: &Actor, _event: EventId) -> bool {
        self.view_orders
    }

    fn can_change_orders(&self, _actor: &Actor, _event: EventId) -> bool {
        self.change_orders
    }

    fn can_change_settings(&self, _actor: &Actor, _event: EventId) -> bool {
        self.change_settings
    }
}
