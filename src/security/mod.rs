//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → hosts.rs (Host header against the allow-list)
//!     → Pass to navigation
//! ```
//!
//! # Design Decisions
//! - Fail closed: unknown or missing host is rejected with 403
//! - Allow-list is swappable at runtime (config reload)

pub mod hosts;

pub use hosts::{allowed_hosts_middleware, HostPolicy, SharedHostPolicy};
