//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (per request, before routing):
//!     router.route() / router.group()
//!     → TopLevel context    → routes
//!     → ExpandingGroup ctx  → backstack (with parent scope)
//!
//! Resolution:
//!     for each top-level entry
//!         → try_match (groups expand: body runs, children queued)
//!         → drain backstack FIFO, qualifying nested URLs
//!     → first match → dispatch (middleware, then callback)
//!     → no match   → Outcome::NotFound
//! ```
//!
//! # Design Decisions
//! - Deterministic: same registrations and request always pick the same route
//! - First match wins, in registration order
//! - Class lookup goes through an explicit registry, never global state

pub mod entry;
pub mod error;
pub mod group;
pub mod registry;
pub mod request;
pub mod route;
pub mod router;

pub use entry::{
    Callback, Entry, EntryKind, HandlerResult, MatchOutcome, ResolvedRoute, RouteEntry, RouteId,
    Scope, Settings,
};
pub use error::{BoxError, RouterError};
pub use group::Group;
pub use registry::{ClassRegistry, Controller};
pub use request::RequestTarget;
pub use route::Route;
pub use router::{LoadedClass, Outcome, RegistrationContext, Router};
