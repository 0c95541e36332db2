//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, host names and the watch ignore pattern
//! - Compile route declarations once to catch bad patterns and redirects
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DevConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use regex::Regex;
use thiserror::Error;

use crate::config::schema::DevConfig;
use crate::http::response::{entry_url, HOT_PATH};
use crate::http::CONFIG_PATH;
use crate::pages::{PageRegistry, PageSource};
use crate::routing::RouteTable;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("entry must not be empty")]
    EmptyEntry,
    #[error("entry is served at '{0}', which is reserved or not a plain path")]
    ReservedEntryUrl(String),
    #[error("source_dir must not be empty")]
    EmptySourceDir,
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),
    #[error("invalid allowed host '{0}'")]
    InvalidAllowedHost(String),
    #[error("invalid watch ignore pattern: {0}")]
    InvalidIgnorePattern(String),
    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
    #[error("invalid routes: {0}")]
    InvalidRoutes(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &DevConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.entry.trim().is_empty() {
        errors.push(ValidationError::EmptyEntry);
    } else {
        let url = entry_url(&config.entry);
        if is_reserved_url(&url) {
            errors.push(ValidationError::ReservedEntryUrl(url));
        }
    }
    if config.source_dir.trim().is_empty() {
        errors.push(ValidationError::EmptySourceDir);
    }

    if config.dev_server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.dev_server.bind_address.clone(),
        ));
    }
    for host in &config.dev_server.allowed_hosts {
        if !is_valid_host(host) {
            errors.push(ValidationError::InvalidAllowedHost(host.clone()));
        }
    }

    if let Err(e) = Regex::new(&config.watch_options.ignored) {
        errors.push(ValidationError::InvalidIgnorePattern(e.to_string()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut pages = PageRegistry::new(PageSource::memory::<_, String, String>([]));
    if let Err(e) = RouteTable::from_defs(&config.routes, &mut pages) {
        errors.push(ValidationError::InvalidRoutes(e.to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The entry URL is mounted beside the server's own routes and in front of
/// navigation; it must not shadow them or carry router syntax.
fn is_reserved_url(url: &str) -> bool {
    url == "/" || url == HOT_PATH || url == CONFIG_PATH || url.contains(['{', '}', '*'])
}

/// Host names only. Ports are not accepted: requests are matched with the
/// port stripped.
fn is_valid_host(host: &str) -> bool {
    let name = host.strip_prefix('.').unwrap_or(host);
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}
