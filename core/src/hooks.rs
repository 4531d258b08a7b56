//! Typed order-lifecycle hooks.
//!
//! Hosts wire these at startup instead of a stringly signal registry: the
//! checkout step answers metadata and confirmation queries, the
//! materializer handles placement. [`LifecycleHooks::standard`] bundles the
//! stock wiring.

use std::sync::Arc;

use async_trait::async_trait;

use crate::checkout::{CartRoomState, RoomStep};
use crate::error::Result;
use crate::materializer::{MaterializeOutcome, OrderMaterializer, RoomIntent};
use crate::types::{CartSnapshot, EventId, OrderId};

/// Called while the host assembles order metadata at confirmation time.
///
/// The returned intent is frozen into the order; materialization never
/// looks at session state again.
pub trait OnOrderMetaRequested: Send + Sync {
    /// The room intent to store on the order being confirmed.
    fn order_meta(&self, state: &CartRoomState) -> RoomIntent;
}

/// Called when the host renders the checkout confirmation page.
#[async_trait]
pub trait OnCheckoutConfirm: Send + Sync {
    /// Human summary lines describing what will happen to rooms.
    async fn confirm_messages(
        &self,
        state: &CartRoomState,
        cart: &CartSnapshot,
    ) -> Result<Vec<String>>;
}

/// Called once per placed order, ideally inside the placement transaction.
#[async_trait]
pub trait OnOrderPlaced: Send + Sync {
    /// Materializes the order's frozen room intent.
    async fn order_placed(
        &self,
        event: EventId,
        order: OrderId,
        intent: RoomIntent,
    ) -> Result<MaterializeOutcome>;
}

impl OnOrderMetaRequested for RoomStep {
    fn order_meta(&self, state: &CartRoomState) -> RoomIntent {
        RoomIntent::from_cart(state)
    }
}

#[async_trait]
impl OnCheckoutConfirm for RoomStep {
    async fn confirm_messages(
        &self,
        state: &CartRoomState,
        cart: &CartSnapshot,
    ) -> Result<Vec<String>> {
        // Inherent method of the same name does the work.
        RoomStep::confirm_messages(self, state, cart).await
    }
}

#[async_trait]
impl OnOrderPlaced for OrderMaterializer {
    async fn order_placed(
        &self,
        event: EventId,
        order: OrderId,
        intent: RoomIntent,
    ) -> Result<MaterializeOutcome> {
        OrderMaterializer::order_placed(self, event, order, intent).await
    }
}

/// The full hook set a host registers at startup.
#[derive(Clone)]
pub struct LifecycleHooks {
    /// Metadata freeze at confirmation.
    pub meta: Arc<dyn OnOrderMetaRequested>,
    /// Confirmation page summary.
    pub confirm: Arc<dyn OnCheckoutConfirm>,
    /// Placement materialization.
    pub placed: Arc<dyn OnOrderPlaced>,
}

impl LifecycleHooks {
    /// Stock wiring: the checkout step answers metadata and confirmation,
    /// the materializer handles placement.
    #[must_use]
    pub fn standard(step: Arc<RoomStep>, materializer: Arc<OrderMaterializer>) -> Self {
        Self {
            meta: step.clone(),
            confirm: step,
            placed: materializer,
        }
    }
}
