//! Application state for Axum handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use roomshare_core::host::{Clock, OrderDirectory, PermissionGate, SettingsStore};
use roomshare_core::store::RoomStore;
use roomshare_core::{MembershipLedger, RoomRegistry};
use roomshare_projections::StatsEngine;

use crate::auth::MetricsAuth;

/// Shared state behind every handler: the host collaborators plus the
/// engine components wired over them.
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(directory, settings, gate, store, clock)
///     .with_metrics_auth(config.metrics_auth())
///     .with_ops_handle(telemetry::install_ops_recorder());
/// let app = roomshare_web::router(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Host order/catalog directory.
    pub directory: Arc<dyn OrderDirectory>,
    /// Host settings storage.
    pub settings: Arc<dyn SettingsStore>,
    /// Host permission predicates.
    pub gate: Arc<dyn PermissionGate>,
    /// Room store.
    pub store: Arc<dyn RoomStore>,
    /// Room creation/update/deletion.
    pub registry: Arc<RoomRegistry>,
    /// Membership operations.
    pub ledger: Arc<MembershipLedger>,
    /// Statistics snapshots.
    pub stats: Arc<StatsEngine>,
    /// Credentials for the business metrics endpoint, when configured.
    pub metrics_auth: Option<MetricsAuth>,
    /// Operational metrics recorder handle, when installed.
    pub ops: Option<PrometheusHandle>,
}

impl AppState {
    /// Wires the engine components over the host collaborators.
    #[must_use]
    pub fn new(
        directory: Arc<dyn OrderDirectory>,
        settings: Arc<dyn SettingsStore>,
        gate: Arc<dyn PermissionGate>,
        store: Arc<dyn RoomStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = Arc::new(RoomRegistry::new(
            store.clone(),
            gate.clone(),
            clock.clone(),
        ));
        let ledger = Arc::new(MembershipLedger::new(
            store.clone(),
            directory.clone(),
            gate.clone(),
            clock,
        ));
        let stats = Arc::new(StatsEngine::new(directory.clone(), store.clone()));
        Self {
            directory,
            settings,
            gate,
            store,
            registry,
            ledger,
            stats,
            metrics_auth: None,
            ops: None,
        }
    }

    /// Guards the business metrics endpoint with the given credentials.
    #[must_use]
    pub fn with_metrics_auth(mut self, auth: Option<MetricsAuth>) -> Self {
        self.metrics_auth = auth;
        self
    }

    /// Serves the operational metrics render at `/internal/metrics`.
    #[must_use]
    pub fn with_ops_handle(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.ops = handle;
        self
    }
}
