//! The route entry contract.
//!
//! # Responsibilities
//! - Define what the router needs from a registered routing unit
//! - Carry inheritable settings and path prefixes down the group tree
//! - Describe callback targets as a closed set resolved at registration time
//!
//! # Design Decisions
//! - Settings merge is a shallow key overwrite (descendant wins)
//! - Matching returns an owned snapshot, so dispatch never borrows the tree
//! - Groups "match" by handing back their body for expansion

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::routing::error::{BoxError, RouterError};
use crate::routing::group::Group;
use crate::routing::request::RequestTarget;
use crate::routing::route::Route;
use crate::routing::router::Router;

/// Settings inherited by descendants of a group.
pub type Settings = Map<String, Value>;

/// Settings key holding an inherited namespace.
pub const NAMESPACE_KEY: &str = "namespace";

/// Settings key holding an inherited middleware identifier.
pub const MIDDLEWARE_KEY: &str = "middleware";

/// What a handler produces: a rendered body or a failure.
pub type HandlerResult = Result<String, BoxError>;

/// A plain function handler, invoked with the matched parameters.
pub type HandlerFn = Arc<dyn Fn(&[String]) -> HandlerResult + Send + Sync>;

/// The registration body of a group, run when the group expands.
pub type GroupBody = Arc<dyn Fn(&mut Router) + Send + Sync>;

/// Overwrite `base` with every key of `overlay`.
pub fn merge_settings(base: &mut Settings, overlay: &Settings) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Identifier assigned to an entry when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two shapes of routing unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A concrete route that can be dispatched.
    Route,
    /// A group whose body registers nested entries.
    Group,
}

/// The target invoked when a route is dispatched.
#[derive(Clone)]
pub enum Callback {
    /// A directly invocable function.
    Function(HandlerFn),
    /// A `Class@method` reference resolved through the class registry.
    Method { class: String, method: String },
}

impl Callback {
    /// Wrap a closure as a callback.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[String]) -> HandlerResult + Send + Sync + 'static,
    {
        Callback::Function(Arc::new(f))
    }

    /// Reference `method` on `class`.
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Callback::Method {
            class: class.into(),
            method: method.into(),
        }
    }
}

impl FromStr for Callback {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Ok(Callback::method(class, method))
            }
            _ => Err(RouterError::InvalidCallback(s.to_string())),
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Function(_) => f.write_str("Function(..)"),
            Callback::Method { class, method } => write!(f, "Method({}@{})", class, method),
        }
    }
}

/// Accumulated settings and prefixes of an entry and all its ancestors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    settings: Settings,
    prefixes: Vec<String>,
}

impl Scope {
    /// The empty scope of a top-level entry's parent.
    pub fn root() -> Self {
        Self::default()
    }

    /// Derive the scope of `entry` nested under `self`.
    pub fn enter(&self, entry: &dyn RouteEntry) -> Self {
        let mut scope = self.clone();
        merge_settings(&mut scope.settings, &entry.mergeable_settings());
        if let Some(prefix) = entry.prefix() {
            scope.prefixes.push(prefix.to_string());
        }
        scope
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// The joined prefixes as an absolute path (`""` when there are none).
    pub fn base_path(&self) -> String {
        if self.prefixes.is_empty() {
            String::new()
        } else {
            format!("/{}", self.prefixes.join("/"))
        }
    }

    /// Rewrite `url` to sit beneath every accumulated prefix.
    pub fn qualify(&self, url: &str) -> String {
        let tail = url.trim_start_matches('/');
        let base = self.base_path();
        if tail.is_empty() {
            if base.is_empty() { "/".to_string() } else { base }
        } else {
            format!("{}/{}", base, tail)
        }
    }
}

/// Snapshot of a matched entry, ready for dispatch.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub url: String,
    pub namespace: Option<String>,
    pub middleware: Option<String>,
    pub callback: Callback,
    /// Matched path parameters, in capture order.
    pub parameters: Vec<String>,
    /// Effective settings after inheritance.
    pub settings: Settings,
}

/// Result of offering a request to an entry.
pub enum MatchOutcome {
    /// The entry handles the request.
    Matched(ResolvedRoute),
    /// The entry is a group covering the request; run its body.
    Expand(GroupBody),
    /// Nothing to do.
    Miss,
}

impl fmt::Debug for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Matched(route) => f.debug_tuple("Matched").field(route).finish(),
            MatchOutcome::Expand(_) => f.write_str("Expand(..)"),
            MatchOutcome::Miss => f.write_str("Miss"),
        }
    }
}

/// A registered routing unit.
pub trait RouteEntry: Send + Sync + fmt::Debug {
    fn kind(&self) -> EntryKind;

    /// Path segment contributed to descendants, without slashes.
    fn prefix(&self) -> Option<&str>;

    fn namespace(&self) -> Option<&str>;

    fn set_namespace(&mut self, namespace: String);

    fn middleware(&self) -> Option<&str>;

    /// Groups have no callback.
    fn callback(&self) -> Option<&Callback>;

    /// Parameters captured by the last successful match.
    fn parameters(&self) -> &[String];

    /// Settings this entry passes on to its descendants.
    fn mergeable_settings(&self) -> Settings;

    /// Apply fully merged settings from the ancestor chain.
    fn set_settings(&mut self, settings: Settings);

    fn url(&self) -> &str;

    fn set_url(&mut self, url: String);

    /// Offer the request to this entry. `scope` already includes the entry itself.
    fn try_match(&mut self, request: &RequestTarget, scope: &Scope) -> MatchOutcome;
}

/// Any entry the router can hold.
#[derive(Debug)]
pub enum Entry {
    Route(Route),
    Group(Group),
    /// An entry type defined outside this crate.
    Custom(Box<dyn RouteEntry>),
}

impl Entry {
    fn inner(&self) -> &dyn RouteEntry {
        match self {
            Entry::Route(route) => route,
            Entry::Group(group) => group,
            Entry::Custom(entry) => entry.as_ref(),
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RouteEntry {
        match self {
            Entry::Route(route) => route,
            Entry::Group(group) => group,
            Entry::Custom(entry) => entry.as_mut(),
        }
    }
}

impl From<Route> for Entry {
    fn from(route: Route) -> Self {
        Entry::Route(route)
    }
}

impl From<Group> for Entry {
    fn from(group: Group) -> Self {
        Entry::Group(group)
    }
}

impl From<Box<dyn RouteEntry>> for Entry {
    fn from(entry: Box<dyn RouteEntry>) -> Self {
        Entry::Custom(entry)
    }
}

impl RouteEntry for Entry {
    fn kind(&self) -> EntryKind {
        self.inner().kind()
    }

    fn prefix(&self) -> Option<&str> {
        self.inner().prefix()
    }

    fn namespace(&self) -> Option<&str> {
        self.inner().namespace()
    }

    fn set_namespace(&mut self, namespace: String) {
        self.inner_mut().set_namespace(namespace)
    }

    fn middleware(&self) -> Option<&str> {
        self.inner().middleware()
    }

    fn callback(&self) -> Option<&Callback> {
        self.inner().callback()
    }

    fn parameters(&self) -> &[String] {
        self.inner().parameters()
    }

    fn mergeable_settings(&self) -> Settings {
        self.inner().mergeable_settings()
    }

    fn set_settings(&mut self, settings: Settings) {
        self.inner_mut().set_settings(settings)
    }

    fn url(&self) -> &str {
        self.inner().url()
    }

    fn set_url(&mut self, url: String) {
        self.inner_mut().set_url(url)
    }

    fn try_match(&mut self, request: &RequestTarget, scope: &Scope) -> MatchOutcome {
        self.inner_mut().try_match(request, scope)
    }
}
