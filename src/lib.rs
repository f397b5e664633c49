//! Nested HTTP route resolution and dispatch.
//!
//! Routes and groups are registered on a per-request [`Router`]; group bodies
//! run only when a request falls under the group, queuing their children on a
//! backstack that is resolved with inherited prefixes and settings.

pub mod builtin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Callback, ClassRegistry, Outcome, RequestTarget, Router, RouterError};
