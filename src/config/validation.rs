//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that routes and groups are well formed
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::routing::Callback;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const METHODS: &[&str] = &["get", "head", "post", "put", "patch", "delete", "options"];

/// A single semantic problem, located by its path in the config tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct ValidationError {
    pub location: String,
    pub message: String,
}

impl ValidationError {
    fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level `{}`", config.observability.log_level),
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        validate_route(route, &format!("routes[{}]", i), &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteConfig, location: &str, errors: &mut Vec<ValidationError>) {
    if route.is_group() {
        if route.url.is_some() {
            errors.push(ValidationError::new(location, "group has a url but no callback"));
        }
        if !route.methods.is_empty() {
            errors.push(ValidationError::new(location, "methods are only allowed on routes"));
        }
        if route.routes.is_empty() {
            errors.push(ValidationError::new(location, "group has no routes"));
        }
        for (i, child) in route.routes.iter().enumerate() {
            validate_route(child, &format!("{}.routes[{}]", location, i), errors);
        }
        return;
    }

    if route.url.is_none() {
        errors.push(ValidationError::new(location, "route has no url"));
    }

    if let Some(callback) = &route.callback {
        if let Err(e) = callback.parse::<Callback>() {
            errors.push(ValidationError::new(location, e.to_string()));
        }
    }

    for method in &route.methods {
        if !METHODS.contains(&method.to_lowercase().as_str()) {
            errors.push(ValidationError::new(location, format!("unknown method `{}`", method)));
        }
    }

    if !route.routes.is_empty() {
        errors.push(ValidationError::new(location, "a route cannot contain nested routes"));
    }
}
