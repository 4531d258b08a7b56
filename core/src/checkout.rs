//! Checkout step: collect room intent while the cart is still a cart.
//!
//! The step never touches memberships. Submitting "create" persists (or
//! edits) the session's pending room row so the materializer can find it by
//! id after placement; submitting "join" only records the verified target.
//! The serde-friendly [`CartRoomState`] is owned by the host's cart session
//! and passed into every call explicitly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomError};
use crate::host::{OrderDirectory, RoomshareSettings};
use crate::password;
use crate::registry::RoomRegistry;
use crate::store::RoomStore;
use crate::types::{CartSnapshot, RoomId};

// ============================================================================
// Session state
// ============================================================================

/// The three ways a buyer can answer the room question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomMode {
    /// No room sharing for this order.
    None,
    /// Found a brand-new room; the buyer becomes its admin.
    Create,
    /// Join an existing room by name and password.
    Join,
}

/// Per-cart room intent, stored in the host's session between requests.
///
/// Holds ids only; the pending-create room row lives in the store. A state
/// with `mode = None` (the field, not the variant) means the step was never
/// answered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRoomState {
    /// Last submitted mode, if any.
    #[serde(default)]
    pub mode: Option<RoomMode>,
    /// Room created (and re-edited) by this session's "create" submissions.
    #[serde(default)]
    pub pending_create: Option<RoomId>,
    /// Room a "join" submission verified against.
    #[serde(default)]
    pub join_target: Option<RoomId>,
}

// ============================================================================
// Step input and output
// ============================================================================

/// One submission of the room step form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RoomStepInput {
    /// Decline room sharing.
    #[serde(rename = "none")]
    OptOut,
    /// Create a room owned by this order-to-be.
    Create {
        /// Requested room name.
        name: String,
        /// Requested room password.
        password: String,
    },
    /// Join an existing room.
    Join {
        /// Name of the room to join.
        name: String,
        /// Password to verify.
        password: String,
    },
}

/// Why the step refuses to count as complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepWarning {
    /// The room's current members hold tickets for different dates than
    /// this cart.
    SubEventMismatch,
}

impl std::fmt::Display for StepWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubEventMismatch => f.write_str(
                "The room you chose belongs to members with tickets for \
                 different dates than your cart.",
            ),
        }
    }
}

/// Completion verdict for the checkout pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCompletion {
    /// The buyer answered the step and nothing stands in the way.
    Complete,
    /// No mode recorded yet; the pipeline must show the step.
    Incomplete,
    /// Answered, but a warning rejects completion until resubmission.
    Blocked(StepWarning),
}

/// Prefill data for rendering the step form. Passwords are never included;
/// only their hashes exist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoomStepForm {
    /// Currently selected mode, if any.
    pub mode: Option<RoomMode>,
    /// Name of the session's pending room, for the create pane.
    pub create_name: Option<String>,
    /// Name of the join target, for the join pane.
    pub join_name: Option<String>,
}

// ============================================================================
// The step
// ============================================================================

/// The room question inside the host's checkout pipeline.
pub struct RoomStep {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn RoomStore>,
    directory: Arc<dyn OrderDirectory>,
}

impl RoomStep {
    /// Creates the step over the shared registry and store.
    #[must_use]
    pub fn new(
        registry: Arc<RoomRegistry>,
        store: Arc<dyn RoomStore>,
        directory: Arc<dyn OrderDirectory>,
    ) -> Self {
        Self {
            registry,
            store,
            directory,
        }
    }

    /// Whether the step participates in this checkout at all.
    #[must_use]
    pub fn applies_to(cart: &CartSnapshot, settings: &RoomshareSettings) -> bool {
        settings.applies_to_cart(cart)
    }

    /// Handles one form submission, updating the session state in place.
    ///
    /// Never creates a membership. Validation failures leave the state
    /// untouched so the form can re-render with the buyer's values.
    ///
    /// # Errors
    ///
    /// Create: the registry's validation errors (§[`RoomRegistry::create_or_update`]).
    /// Join: [`RoomError::RoomNotFound`] for an unknown name,
    /// [`RoomError::PasswordMismatch`] when the password does not verify.
    pub async fn submit(
        &self,
        state: &mut CartRoomState,
        cart: &CartSnapshot,
        input: &RoomStepInput,
    ) -> Result<()> {
        match input {
            RoomStepInput::OptOut => {
                state.mode = Some(RoomMode::None);
                Ok(())
            }
            RoomStepInput::Create { name, password } => {
                let room = self
                    .registry
                    .create_or_update(cart.event, state.pending_create, name, password, None)
                    .await?;
                state.mode = Some(RoomMode::Create);
                state.pending_create = Some(room.id);
                Ok(())
            }
            RoomStepInput::Join { name, password } => {
                let room = self.registry.find_by_name(cart.event, name).await?;
                if !password::verify_password(&room.password_hash, password.trim())? {
                    return Err(RoomError::PasswordMismatch);
                }
                state.mode = Some(RoomMode::Join);
                state.join_target = Some(room.id);
                Ok(())
            }
        }
    }

    /// Whether the pipeline may move past this step.
    ///
    /// With sub-events in play, a referenced room whose members hold
    /// tickets for other dates blocks completion. The check is advisory:
    /// an empty room passes, and nothing re-validates at placement.
    ///
    /// # Errors
    ///
    /// [`RoomError::Storage`] from the store or directory.
    pub async fn is_complete(
        &self,
        state: &CartRoomState,
        cart: &CartSnapshot,
    ) -> Result<StepCompletion> {
        let Some(mode) = state.mode else {
            return Ok(StepCompletion::Incomplete);
        };
        let referenced = match mode {
            RoomMode::None => None,
            RoomMode::Create => state.pending_create,
            RoomMode::Join => state.join_target,
        };
        let Some(room) = referenced else {
            // "create"/"join" without an id means the submission never
            // went through; treat like an unanswered step.
            if mode == RoomMode::None {
                return Ok(StepCompletion::Complete);
            }
            return Ok(StepCompletion::Incomplete);
        };
        if !cart.has_subevents {
            return Ok(StepCompletion::Complete);
        }
        let members = self.store.memberships_for_room(room).await?;
        if members.is_empty() {
            return Ok(StepCompletion::Complete);
        }
        let mut member_dates = std::collections::BTreeSet::new();
        for member in &members {
            if let Some(order) = self.directory.order(cart.event, member.order).await? {
                member_dates.extend(order.subevents());
            }
        }
        if !member_dates.is_empty() && member_dates != cart.subevents() {
            tracing::debug!(room = %room, "room members hold different sub-events than the cart");
            return Ok(StepCompletion::Blocked(StepWarning::SubEventMismatch));
        }
        Ok(StepCompletion::Complete)
    }

    /// Prefill data for the step form.
    ///
    /// # Errors
    ///
    /// [`RoomError::Storage`] from room lookups.
    pub async fn render(&self, state: &CartRoomState, cart: &CartSnapshot) -> Result<RoomStepForm> {
        let mut form = RoomStepForm {
            mode: state.mode,
            ..RoomStepForm::default()
        };
        if let Some(id) = state.pending_create {
            form.create_name = self
                .store
                .room(cart.event, id)
                .await?
                .map(|room| room.name);
        }
        if let Some(id) = state.join_target {
            form.join_name = self
                .store
                .room(cart.event, id)
                .await?
                .map(|room| room.name);
        }
        Ok(form)
    }

    /// Human summary lines for the confirmation page.
    ///
    /// # Errors
    ///
    /// [`RoomError::Storage`] from room lookups.
    pub async fn confirm_messages(
        &self,
        state: &CartRoomState,
        cart: &CartSnapshot,
    ) -> Result<Vec<String>> {
        let room_name = |id: Option<RoomId>| async move {
            match id {
                Some(id) => Ok::<_, RoomError>(
                    self.store.room(cart.event, id).await?.map(|room| room.name),
                ),
                None => Ok(None),
            }
        };
        let message = match state.mode {
            Some(RoomMode::Create) => room_name(state.pending_create)
                .await?
                .map(|name| format!("After your purchase you will own the room \"{name}\".")),
            Some(RoomMode::Join) => room_name(state.join_target)
                .await?
                .map(|name| format!("After your purchase you will join the room \"{name}\".")),
            Some(RoomMode::None) | None => None,
        };
        Ok(message.into_iter().collect())
    }
}
