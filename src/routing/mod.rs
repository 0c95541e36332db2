//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation path
//!     → router.rs (ordered route lookup, redirect following)
//!     → matcher.rs (segment-wise pattern match)
//!     → Return: Resolution (route, page component, params) or RoutingError
//!
//! Route Compilation (at startup):
//!     RouteDef[] (config or table.rs)
//!     → Parse patterns
//!     → Share page components per module
//!     → Move wildcard routes last
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins; wildcard routes always lose to everything else
//! - The router never branches on route meta; pages do

pub mod matcher;
pub mod route;
pub mod router;
pub mod table;

pub use matcher::{Params, PathPattern, PatternError};
pub use route::{RouteDef, RouteEntry, RouteMeta, RouteTarget};
pub use router::{Resolution, RouteError, RouteMatch, RouteTable, RoutingError, MAX_REDIRECTS};
pub use table::{app_routes, NOT_FOUND_PATH};
