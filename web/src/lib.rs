//! # Roomshare Web
//!
//! Axum surface for the room-sharing engine: the staff control API,
//! the customer self-service route and Prometheus metrics exposition.
//!
//! # Layout
//!
//! - [`routes`]: the route table
//! - [`handlers`]: one module per resource (rooms, orders, settings,
//!   stats, metrics)
//! - [`state`]: shared application state handed to every handler
//! - [`middleware`]: actor resolution for the control surface
//! - [`auth`]: Basic-auth guard for the metrics endpoint
//! - [`config`]: environment-driven server configuration
//! - [`telemetry`]: tracing and operational-metrics setup
//!
//! # Example
//!
//! ```ignore
//! use roomshare_web::{router, ActorLayer, AppState, Config};
//!
//! let config = Config::from_env();
//! roomshare_web::telemetry::init_tracing(&config.log);
//!
//! let state = AppState::new(directory, settings, gate, store, clock)
//!     .with_metrics_auth(config.metrics_auth());
//! let app = router(state).layer(ActorLayer::from_header("x-roomshare-staff"));
//!
//! let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use auth::MetricsAuth;
pub use config::Config;
pub use error::AppError;
pub use extractors::RequestActor;
pub use middleware::ActorLayer;
pub use routes::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
