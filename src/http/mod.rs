//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → security (allowed hosts)
//!     → routing (resolve navigation)
//!     → pages (lazy load, render)
//!     → response.rs (HTML shell, hot reload client)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer, CONFIG_PATH};
