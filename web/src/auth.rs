//! HTTP Basic authentication for the business metrics endpoint.
//!
//! Every failure mode answers with the same opaque 401: missing or
//! malformed header, unknown user, wrong passphrase, and unset server
//! configuration are indistinguishable to the caller. Credential
//! comparison is constant-time.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::Engine;
use constant_time_eq::constant_time_eq;

/// Configured credentials guarding `GET /metrics/rooms/...`.
#[derive(Clone, Debug)]
pub struct MetricsAuth {
    user: String,
    passphrase: String,
}

impl MetricsAuth {
    /// Creates credentials from the configured user and passphrase.
    pub fn new(user: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            passphrase: passphrase.into(),
        }
    }

    /// Checks an `Authorization` header value against the credentials.
    ///
    /// Both the user and the passphrase are compared in constant time, and
    /// both comparisons always run.
    #[must_use]
    pub fn allows(&self, authorization: Option<&HeaderValue>) -> bool {
        let Some(value) = authorization.and_then(|v| v.to_str().ok()) else {
            return false;
        };
        let Some(encoded) = value.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let Ok(credentials) = String::from_utf8(decoded) else {
            return false;
        };
        let Some((user, passphrase)) = credentials.split_once(':') else {
            return false;
        };
        let user_ok = constant_time_eq(user.as_bytes(), self.user.as_bytes());
        let passphrase_ok = constant_time_eq(passphrase.as_bytes(), self.passphrase.as_bytes());
        user_ok && passphrase_ok
    }
}

/// The one fixed response for every unauthenticated metrics request.
#[must_use]
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"metrics\"")],
        "unauthorized\n",
    )
        .into_response()
}
