//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DevConfig (validated, immutable)
//!     → routes compiled, dev server started
//!     → bundler.rs renders the pass-through view for the bundler
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → allowed hosts swapped atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the host allow-list applies live
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod bundler;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use bundler::BundlerConfig;
pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{DevConfig, DevServerConfig, ObservabilityConfig, TimeoutConfig, WatchOptions};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
