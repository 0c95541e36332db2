//! CareerTrack development server library.
//!
//! Serves the CareerTrack single-page application during development:
//! resolves navigations against the application's route table, loads page
//! views on first use, enforces the host allow-list and pushes hot reload
//! events when sources change.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pages;
pub mod routing;
pub mod security;
pub mod watch;

pub use config::DevConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
