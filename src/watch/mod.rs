//! Source watching and hot reload.
//!
//! # Data Flow
//! ```text
//! filesystem (native events or polling)
//!     → source.rs (drop ignored paths)
//!     → mpsc channel
//!     → reload.rs (invalidate pages, bump version)
//!     → broadcast to connected clients (SSE)
//! ```
//!
//! # Design Decisions
//! - A change to a page module invalidates only that page
//! - Any other change invalidates every page
//! - Changes queued while a rebuild runs are coalesced

pub mod reload;
pub mod source;

pub use reload::{HotReloader, ReloadEvent, ReloadHub};
pub use source::{SourceChange, SourceWatcher};
