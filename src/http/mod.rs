//! HTTP front-end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, trace + timeout layers)
//!     → fresh per-request Router
//!     → RouteTable registers routes
//!     → route_request()
//!         Dispatched → 200 with body
//!         NotFound   → 404
//!         error      → 403 (middleware refusal) / 500
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
