//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::Settings;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Namespace given to every entry registered without one.
    pub default_namespace: Option<String>,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Top-level routes and groups, in matching order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time to route and render) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// One route or group.
///
/// An entry with a `callback` is a route; without one it is a group whose
/// nested `routes` are registered when a request falls under its prefix.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteConfig {
    /// URL pattern, e.g. "/users/{id}". Routes only.
    pub url: Option<String>,

    /// `Class@method` target. Routes only.
    pub callback: Option<String>,

    /// Allowed methods; empty means any. Routes only.
    pub methods: Vec<String>,

    /// Path segment prepended to every descendant.
    pub prefix: Option<String>,

    pub namespace: Option<String>,

    /// Middleware class run before the callback.
    pub middleware: Option<String>,

    /// Arbitrary settings inherited by descendants.
    pub settings: Settings,

    /// Nested entries. Groups only.
    pub routes: Vec<RouteConfig>,
}

impl RouteConfig {
    pub fn is_group(&self) -> bool {
        self.callback.is_none()
    }
}
