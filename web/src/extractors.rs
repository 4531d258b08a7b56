//! Custom Axum extractors.
//!
//! [`RequestActor`] pulls the acting identity out of request extensions,
//! where the host's middleware (or [`ActorLayer`]) put it. Handlers take it
//! as a parameter and pass it on to the permission gate and the audit
//! trail.
//!
//! [`ActorLayer`]: crate::middleware::ActorLayer

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use roomshare_core::RoomError;
use roomshare_core::types::Actor;

use crate::error::AppError;

/// The identity performing the request.
///
/// # Example
///
/// ```ignore
/// async fn handler(RequestActor(actor): RequestActor) -> Result<Json<Rooms>, AppError> {
///     if !state.gate.can_view_orders(&actor, event) {
///         return Err(RoomError::PermissionDenied.into());
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequestActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // No actor on the request means no identity was authenticated;
        // answer like any other missing permission.
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::from(RoomError::PermissionDenied))
    }
}
