//! Route groups.
//!
//! A group shares a prefix, namespace, middleware and settings with every
//! entry registered inside its body. The body is not run at registration time:
//! it runs when a request falls under the group's prefix, so nested entries
//! only exist for requests that can reach them.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::routing::entry::{
    Callback, EntryKind, GroupBody, MatchOutcome, RouteEntry, Scope, Settings, MIDDLEWARE_KEY,
    NAMESPACE_KEY,
};
use crate::routing::request::RequestTarget;
use crate::routing::route::{match_prefix, normalize_prefix, own_settings};
use crate::routing::router::Router;

/// A group of routes registered by a body closure.
#[derive(Clone)]
pub struct Group {
    url: String,
    prefix: Option<String>,
    namespace: Option<String>,
    middleware: Option<String>,
    settings: Settings,
    body: GroupBody,
}

impl Group {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut Router) + Send + Sync + 'static,
    {
        Self {
            url: String::new(),
            prefix: None,
            namespace: None,
            middleware: None,
            settings: Settings::new(),
            body: Arc::new(body),
        }
    }

    pub fn set_prefix(&mut self, prefix: &str) -> &mut Self {
        self.prefix = normalize_prefix(prefix);
        self
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn set_middleware(&mut self, middleware: impl Into<String>) -> &mut Self {
        self.middleware = Some(middleware.into());
        self
    }

    /// Attach a setting inherited by every descendant.
    pub fn setting(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.settings.insert(key.into(), value.into());
        self
    }

}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("namespace", &self.namespace)
            .field("middleware", &self.middleware)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RouteEntry for Group {
    fn kind(&self) -> EntryKind {
        EntryKind::Group
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.namespace = Some(namespace);
    }

    fn middleware(&self) -> Option<&str> {
        self.middleware.as_deref()
    }

    fn callback(&self) -> Option<&Callback> {
        None
    }

    fn parameters(&self) -> &[String] {
        &[]
    }

    fn mergeable_settings(&self) -> Settings {
        own_settings(&self.settings, self.namespace.as_deref(), self.middleware.as_deref())
    }

    /// Groups hand their settings down through the scope and keep only the
    /// inherited namespace and middleware.
    fn set_settings(&mut self, settings: Settings) {
        if let Some(Value::String(namespace)) = settings.get(NAMESPACE_KEY) {
            self.namespace = Some(namespace.clone());
        }
        if let Some(Value::String(middleware)) = settings.get(MIDDLEWARE_KEY) {
            self.middleware = Some(middleware.clone());
        }
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn set_url(&mut self, url: String) {
        self.url = url;
    }

    fn try_match(&mut self, request: &RequestTarget, scope: &Scope) -> MatchOutcome {
        if match_prefix(&scope.base_path(), request.path()) {
            MatchOutcome::Expand(Arc::clone(&self.body))
        } else {
            MatchOutcome::Miss
        }
    }
}
