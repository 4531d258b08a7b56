//! Control handlers for per-event room-sharing settings.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::Json;
use roomshare_core::host::RoomshareSettings;
use roomshare_core::types::{ProductId, ProductRef};
use roomshare_core::RoomError;
use serde::Serialize;

use super::resolve_event;
use crate::error::AppError;
use crate::extractors::RequestActor;
use crate::state::AppState;

/// Settings plus the product choices the form can offer.
#[derive(Debug, Serialize)]
pub struct SettingsView {
    /// Current settings
    pub settings: RoomshareSettings,
    /// Products of the event, for the eligible-products choices
    pub products: Vec<ProductRef>,
}

/// `GET /control/event/:organizer/:event/settings`
pub async fn show(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
) -> Result<Json<SettingsView>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    if !state.gate.can_change_settings(&actor, event.id) {
        return Err(RoomError::PermissionDenied.into());
    }
    let (settings, products) = tokio::try_join!(
        state.settings.settings(event.id),
        state.directory.products(event.id),
    )?;
    Ok(Json(SettingsView { settings, products }))
}

/// `PUT /control/event/:organizer/:event/settings`
///
/// Eligible products must come from the event's own catalog.
pub async fn update(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    RequestActor(actor): RequestActor,
    Json(body): Json<RoomshareSettings>,
) -> Result<Json<RoomshareSettings>, AppError> {
    let event = resolve_event(&state, &organizer, &event).await?;
    if !state.gate.can_change_settings(&actor, event.id) {
        return Err(RoomError::PermissionDenied.into());
    }

    let catalog: BTreeSet<ProductId> = state
        .directory
        .products(event.id)
        .await?
        .into_iter()
        .map(|product| product.id)
        .collect();
    if let Some(unknown) = body
        .eligible_products
        .iter()
        .find(|id| !catalog.contains(id))
    {
        return Err(AppError::validation(format!(
            "Product {unknown} is not sold by this event"
        )));
    }

    state.settings.update_settings(event.id, body.clone()).await?;
    Ok(Json(body))
}
