//! Tracing and operational-metrics wiring.
//!
//! Initialization is guarded so repeated calls (tests, embedded hosts that
//! already installed a subscriber or recorder) degrade to no-ops instead of
//! panicking.

use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use roomshare_core::metrics::describe_ops_metrics;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static OPS_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Initializes the tracing subscriber with the given filter directive.
///
/// Falls back to [`crate::config::DEFAULT_LOG_FILTER`] when the directive
/// does not parse, and does nothing if a subscriber is already set.
pub fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Installs the Prometheus recorder for the engine's operational counters
/// and returns its render handle.
///
/// Counter metadata is registered right after installation so the scrape
/// carries help texts. Returns `None` when another recorder is already
/// installed; the engine still records into that one, it just cannot be
/// rendered from here.
pub fn install_ops_recorder() -> Option<PrometheusHandle> {
    OPS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                describe_ops_metrics();
                Some(handle)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "metrics recorder already installed, /internal/metrics disabled"
                );
                None
            }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_init_is_idempotent() {
        init_tracing("roomshare=debug");
        init_tracing("not a ==== directive");
    }

    #[test]
    fn recorder_installs_once() {
        let first = install_ops_recorder();
        let second = install_ops_recorder();
        assert_eq!(first.is_some(), second.is_some());
    }
}
