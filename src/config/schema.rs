//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dev server.
//! All types derive Serde traits for deserialization from config files, and every
//! section falls back to the values the frontend build has always used.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::RouteDef;

/// Root configuration for the dev server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    /// Bootstrap module of the application (e.g., "./src/main.js").
    pub entry: String,

    /// Directory page modules are read from and watched in.
    pub source_dir: String,

    /// Dev server settings (bind address, host allow-list, hot reload).
    pub dev_server: DevServerConfig,

    /// Enable filesystem watching to trigger rebuilds.
    pub watch: bool,

    /// Watch tuning.
    pub watch_options: WatchOptions,

    /// Apply source transformation to third-party dependency code.
    /// Carried for the external bundler; not interpreted here.
    pub transpile_dependencies: bool,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route declarations, matched in order.
    pub routes: Vec<RouteDef>,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            entry: "./src/main.js".to_string(),
            source_dir: "src".to_string(),
            dev_server: DevServerConfig::default(),
            watch: true,
            watch_options: WatchOptions::default(),
            transpile_dependencies: true,
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: crate::routing::table::app_routes(),
        }
    }
}

/// Dev server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Host header values the server accepts.
    pub allowed_hosts: Vec<String>,

    /// Replace changed views in place instead of requiring a manual reload.
    pub hot: bool,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            allowed_hosts: vec!["careertrack.ddns.net".to_string(), "localhost".to_string()],
            hot: true,
        }
    }
}

/// File watch tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Regex; paths matching it are excluded from the watch set.
    pub ignored: String,

    /// Poll interval in milliseconds. Zero uses native filesystem events.
    pub poll_ms: u64,
}

impl WatchOptions {
    /// Polling interval, or `None` when native events are used.
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_ms > 0).then(|| Duration::from_millis(self.poll_ms))
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            ignored: "node_modules".to_string(),
            poll_ms: 1000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
