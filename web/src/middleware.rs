//! Request middleware: acting-identity injection.
//!
//! Control routes authorize against the host's [`PermissionGate`] using the
//! [`Actor`] on the request. Hosts embed the engine behind their own session
//! or token middleware and are expected to insert the resolved actor into
//! request extensions themselves; [`ActorLayer`] is a ready-made tower layer
//! for that, used by the demo binary and the tests.
//!
//! [`PermissionGate`]: roomshare_core::host::PermissionGate

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{extract::Request, http::HeaderMap, response::Response};
use roomshare_core::types::Actor;
use tower::{Layer, Service};

type ResolveFn = dyn Fn(&HeaderMap) -> Option<Actor> + Send + Sync;

/// Layer that resolves the acting identity and stores it in request
/// extensions, where [`RequestActor`] picks it up.
///
/// # Example
///
/// ```ignore
/// let app = roomshare_web::router(state)
///     .layer(ActorLayer::from_header("x-roomshare-staff"));
/// ```
///
/// [`RequestActor`]: crate::extractors::RequestActor
#[derive(Clone)]
pub struct ActorLayer {
    resolve: Arc<ResolveFn>,
}

impl ActorLayer {
    /// Resolves every request to the same actor. Intended for tests.
    #[must_use]
    pub fn fixed(actor: Actor) -> Self {
        Self {
            resolve: Arc::new(move |_| Some(actor.clone())),
        }
    }

    /// Reads a staff handle from the named header.
    ///
    /// Requests without the header carry no actor, so control routes
    /// respond 403. Real hosts resolve their session instead; header-based
    /// identity is only suitable behind a trusted proxy.
    #[must_use]
    pub fn from_header(name: &'static str) -> Self {
        Self {
            resolve: Arc::new(move |headers: &HeaderMap| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(|handle| Actor::Staff(handle.to_owned()))
            }),
        }
    }

    /// Resolves the actor with a custom function over the request headers.
    pub fn resolve_with<F>(resolve: F) -> Self
    where
        F: Fn(&HeaderMap) -> Option<Actor> + Send + Sync + 'static,
    {
        Self {
            resolve: Arc::new(resolve),
        }
    }
}

impl<S> Layer<S> for ActorLayer {
    type Service = ActorMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ActorMiddleware {
            inner,
            resolve: self.resolve.clone(),
        }
    }
}

/// Middleware service created by [`ActorLayer`].
#[derive(Clone)]
pub struct ActorMiddleware<S> {
    inner: S,
    resolve: Arc<ResolveFn>,
}

impl<S> Service<Request> for ActorMiddleware<S>
where
    S: Service<Request, Response = Response>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        if let Some(actor) = (self.resolve)(req.headers()) {
            req.extensions_mut().insert(actor);
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, extract::Extension, http::Request, routing::get};
    use tower::ServiceExt;

    async fn whoami(actor: Option<Extension<Actor>>) -> String {
        match actor {
            Some(Extension(Actor::Staff(handle))) => format!("staff:{handle}"),
            Some(Extension(actor)) => format!("{actor:?}"),
            None => "anonymous".to_owned(),
        }
    }

    #[tokio::test]
    async fn header_resolution_injects_a_staff_actor() {
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(ActorLayer::from_header("x-staff"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("x-staff", "ada")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"staff:ada");
    }

    #[tokio::test]
    async fn missing_header_leaves_the_request_anonymous() {
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(ActorLayer::from_header("x-staff"));

        let response = app
            .oneshot(Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"anonymous");
    }
}
