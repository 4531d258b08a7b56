//! Server configuration from environment variables.
//!
//! All keys are optional and default to local-development values; read once
//! at startup with [`Config::from_env`]. The demo binary loads a local
//! `.env` first via `dotenvy`.

use crate::auth::MetricsAuth;

/// Default tracing filter when `ROOMSHARE_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "roomshare=info,tower_http=debug";

/// Web server configuration.
///
/// | key | default |
/// |-----|---------|
/// | `ROOMSHARE_SERVER_HOST` | `127.0.0.1` |
/// | `ROOMSHARE_SERVER_PORT` | `8374` |
/// | `ROOMSHARE_LOG` | `roomshare=info,tower_http=debug` |
/// | `ROOMSHARE_METRICS_USER` | unset (metrics endpoint locked) |
/// | `ROOMSHARE_METRICS_PASSPHRASE` | unset (metrics endpoint locked) |
/// | `ROOMSHARE_OPS_METRICS` | `false` |
#[derive(Clone, Debug)]
pub struct Config {
    /// Interface the server binds to.
    pub host: String,
    /// Port the server binds to.
    pub port: u16,
    /// Tracing filter directive.
    pub log: String,
    /// Basic-auth user for the business metrics endpoint.
    pub metrics_user: Option<String>,
    /// Basic-auth passphrase for the business metrics endpoint.
    pub metrics_passphrase: Option<String>,
    /// Whether to install the operational metrics recorder.
    pub ops_metrics: bool,
}

impl Config {
    /// Loads the configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("ROOMSHARE_SERVER_HOST")
                .unwrap_or_else(|_| "127.0.0.1".to_owned()),
            port: std::env::var("ROOMSHARE_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8374),
            log: std::env::var("ROOMSHARE_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned()),
            metrics_user: std::env::var("ROOMSHARE_METRICS_USER")
                .ok()
                .filter(|s| !s.is_empty()),
            metrics_passphrase: std::env::var("ROOMSHARE_METRICS_PASSPHRASE")
                .ok()
                .filter(|s| !s.is_empty()),
            ops_metrics: std::env::var("ROOMSHARE_OPS_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Address to bind the listener to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Metrics credentials, when both parts are configured.
    ///
    /// Returning `None` leaves the business metrics endpoint answering the
    /// same opaque 401 it uses for wrong credentials.
    #[must_use]
    pub fn metrics_auth(&self) -> Option<MetricsAuth> {
        match (&self.metrics_user, &self.metrics_passphrase) {
            (Some(user), Some(passphrase)) => Some(MetricsAuth::new(user, passphrase)),
            _ => None,
        }
    }
}
