//! Metrics endpoints: per-event business metrics and operational counters.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use roomshare_projections::{render_metrics, METRICS_CONTENT_TYPE};

use super::resolve_event;
use crate::auth;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /metrics/rooms/:organizer/:event`
///
/// Prometheus text exposition of the event's room statistics, guarded
/// by Basic auth. Every failure mode answers the same 401: missing
/// header, malformed header, wrong credentials, and credentials never
/// being configured all look identical to the caller.
pub async fn event_metrics(
    State(state): State<AppState>,
    Path((organizer, event)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let authorized = state
        .metrics_auth
        .as_ref()
        .is_some_and(|auth| auth.allows(headers.get(header::AUTHORIZATION)));
    if !authorized {
        return Ok(auth::unauthorized());
    }

    let event = resolve_event(&state, &organizer, &event).await?;
    let snapshot = state.stats.snapshot(event.id).await?;
    Ok((
        [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        render_metrics(&snapshot),
    )
        .into_response())
}

/// `GET /internal/metrics`
///
/// Render of the process-level metrics recorder. Answers 404 until
/// [`crate::telemetry::install_ops_recorder`] has handed the state a
/// recorder handle.
#[allow(clippy::unused_async)] // handlers must be async
pub async fn operational(State(state): State<AppState>) -> Response {
    match &state.ops {
        Some(handle) => (
            [(header::CONTENT_TYPE, METRICS_CONTENT_TYPE)],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
