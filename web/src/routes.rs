//! Route table for the roomshare HTTP surface.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the application router.
///
/// Control routes expect an [`crate::middleware::ActorLayer`] upstream
/// to resolve the acting staff member; requests that reach them without
/// an actor are answered with 403. The customer route authenticates by
/// order secret and needs no actor.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Staff control surface. The static `stats` segment wins over
        // the `:room` capture next to it.
        .route(
            "/control/event/:organizer/:event/rooms",
            get(handlers::rooms::list),
        )
        .route(
            "/control/event/:organizer/:event/rooms/stats",
            get(handlers::stats::dashboard),
        )
        .route(
            "/control/event/:organizer/:event/rooms/:room",
            get(handlers::rooms::detail).delete(handlers::rooms::delete),
        )
        .route(
            "/control/event/:organizer/:event/settings",
            get(handlers::settings::show).put(handlers::settings::update),
        )
        .route(
            "/control/event/:organizer/:event/orders/:code/room",
            put(handlers::orders::assign),
        )
        // Customer self-service, authenticated by the order secret.
        .route(
            "/event/:organizer/:event/order/:code/:secret/room",
            post(handlers::orders::modify),
        )
        // Metrics exposition.
        .route(
            "/metrics/rooms/:organizer/:event",
            get(handlers::metrics::event_metrics),
        )
        .route("/internal/metrics", get(handlers::metrics::operational))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
