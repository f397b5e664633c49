//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → structured `tracing` events (registration, resolution, dispatch)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → tower-http TraceLayer spans around each HTTP request
//! ```
//!
//! # Design Decisions
//! - Structured fields, not formatted strings, for route ids, urls and classes
//! - Registration is logged at trace level; it happens on every request

pub mod logging;

pub use logging::init_logging;
