//! Metrics collection and exposition.
//!
//! # Metrics
//! - `devserver_navigations_total` (counter): navigations by outcome
//! - `devserver_page_load_seconds` (histogram): first-activation load time per module
//! - `devserver_rebuilds_total` (counter): hot reload events by scope
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label values for `devserver_navigations_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Page,
    Redirect,
    NotFound,
    Error,
}

impl NavigationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Redirect => "redirect",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_navigation(outcome: NavigationOutcome, route: &str) {
    ::metrics::counter!(
        "devserver_navigations_total",
        "outcome" => outcome.as_str(),
        "route" => route.to_string()
    )
    .increment(1);
}

pub fn record_page_load(module: &str, start: Instant) {
    ::metrics::histogram!("devserver_page_load_seconds", "module" => module.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rebuild(full: bool) {
    let scope = if full { "full" } else { "pages" };
    ::metrics::counter!("devserver_rebuilds_total", "scope" => scope).increment(1);
}
