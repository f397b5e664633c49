//! Routing and dispatch errors.
//!
//! Every variant is fatal to the request being served. A request that simply
//! matches nothing is not an error; see [`Outcome::NotFound`](super::router::Outcome).

use thiserror::Error;

/// A boxed error type returned by handlers, controllers and middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while dispatching a matched route.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A middleware or controller class is not present in the registry.
    #[error("Class {0} does not exist")]
    ClassNotFound(String),

    /// The resolved controller does not expose the requested method.
    #[error("Method {method} does not exist on {class}")]
    MethodNotFound { class: String, method: String },

    /// A callback string is not of the form `Class@method`.
    #[error("Invalid callback `{0}`, expected `Class@method`")]
    InvalidCallback(String),

    /// A middleware refused the request while being constructed.
    #[error("Middleware {name} rejected the request: {source}")]
    Middleware {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The route handler itself failed.
    #[error("Handler failed: {0}")]
    Handler(#[source] BoxError),
}
