//! Route registration, resolution and dispatch.
//!
//! # Responsibilities
//! - Place new entries at the top level or on the backstack
//! - Walk top-level entries, expanding groups into the backstack
//! - Rewrite nested routes to their fully prefixed URL
//! - Dispatch the first match to a function or a `Class@method` target
//!
//! # Design Decisions
//! - One `Router` per request: no shared mutable state between requests
//! - Registration context is explicit and restored when a group body returns
//! - The backstack is a FIFO queue; each pending entry carries its parent scope
//! - First match wins and stops the walk entirely
//! - No match is an outcome, not an error

use std::collections::VecDeque;
use std::sync::Arc;

use crate::routing::entry::{
    Callback, Entry, EntryKind, GroupBody, MatchOutcome, ResolvedRoute, RouteEntry, RouteId,
    Scope,
};
use crate::routing::error::RouterError;
use crate::routing::group::Group;
use crate::routing::registry::{qualify_class, ClassRegistry, Controller};
use crate::routing::request::RequestTarget;
use crate::routing::route::Route;

/// Where newly added entries are placed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RegistrationContext {
    /// Entries become top-level routes.
    #[default]
    TopLevel,
    /// A group body is running; entries are queued on the backstack under `scope`.
    ExpandingGroup { parent: RouteId, scope: Scope },
}

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A route matched; carries the handler output.
    Dispatched(String),
    /// Nothing matched. The caller decides how to answer.
    NotFound,
}

/// A controller instantiated during dispatch.
pub struct LoadedClass {
    name: String,
    instance: Box<dyn Controller>,
}

impl LoadedClass {
    /// Fully qualified class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instance(&self) -> &dyn Controller {
        self.instance.as_ref()
    }
}

impl std::fmt::Debug for LoadedClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedClass").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Registered {
    id: RouteId,
    entry: Entry,
}

#[derive(Debug)]
struct Pending {
    id: RouteId,
    entry: Entry,
    /// Scope of the group that registered this entry.
    parent: Scope,
}

/// Per-request router.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Registered>,
    backstack: VecDeque<Pending>,
    context: RegistrationContext,
    current_route: Option<ResolvedRoute>,
    loaded_class: Option<LoadedClass>,
    default_namespace: Option<String>,
    request: RequestTarget,
    registry: Arc<ClassRegistry>,
    next_id: usize,
}

impl Router {
    /// Create a router for one request.
    pub fn new(request: RequestTarget, registry: Arc<ClassRegistry>) -> Self {
        Self {
            routes: Vec::new(),
            backstack: VecDeque::new(),
            context: RegistrationContext::TopLevel,
            current_route: None,
            loaded_class: None,
            default_namespace: None,
            request,
            registry,
            next_id: 0,
        }
    }

    // ===== Registration =====

    /// Register an entry and return its id.
    ///
    /// Entries without a namespace receive the default namespace. While a group
    /// body is running the entry is queued on the backstack, otherwise it becomes
    /// a top-level route.
    pub fn add_route(&mut self, entry: impl Into<Entry>) -> RouteId {
        let (id, _) = self.place(entry.into());
        id
    }

    /// Register a route for `url` answering any method, and return it for
    /// further configuration.
    pub fn route(&mut self, url: &str, callback: Callback) -> &mut Route {
        let (_, entry) = self.place(Entry::Route(Route::new(url, callback)));
        let Entry::Route(route) = entry else {
            unreachable!("a route was just placed");
        };
        route
    }

    pub fn get(&mut self, url: &str, callback: Callback) -> &mut Route {
        self.route(url, callback).methods(["get"])
    }

    pub fn post(&mut self, url: &str, callback: Callback) -> &mut Route {
        self.route(url, callback).methods(["post"])
    }

    pub fn put(&mut self, url: &str, callback: Callback) -> &mut Route {
        self.route(url, callback).methods(["put"])
    }

    pub fn patch(&mut self, url: &str, callback: Callback) -> &mut Route {
        self.route(url, callback).methods(["patch"])
    }

    pub fn delete(&mut self, url: &str, callback: Callback) -> &mut Route {
        self.route(url, callback).methods(["delete"])
    }

    /// Register a group whose `body` runs when a request falls under it.
    pub fn group<F>(&mut self, body: F) -> &mut Group
    where
        F: Fn(&mut Router) + Send + Sync + 'static,
    {
        let (_, entry) = self.place(Entry::Group(Group::new(body)));
        let Entry::Group(group) = entry else {
            unreachable!("a group was just placed");
        };
        group
    }

    fn place(&mut self, mut entry: Entry) -> (RouteId, &mut Entry) {
        if entry.namespace().is_none() {
            if let Some(namespace) = &self.default_namespace {
                entry.set_namespace(namespace.clone());
            }
        }

        let id = RouteId(self.next_id);
        self.next_id += 1;

        match &self.context {
            RegistrationContext::TopLevel => {
                tracing::trace!(route_id = %id, kind = ?entry.kind(), url = entry.url(), "Route registered");
                self.routes.push(Registered { id, entry });
                let index = self.routes.len() - 1;
                (id, &mut self.routes[index].entry)
            }
            RegistrationContext::ExpandingGroup { parent, scope } => {
                tracing::trace!(route_id = %id, parent = %parent, kind = ?entry.kind(), url = entry.url(), "Route queued on backstack");
                let parent = scope.clone();
                self.backstack.push_back(Pending { id, entry, parent });
                let index = self.backstack.len() - 1;
                (id, &mut self.backstack[index].entry)
            }
        }
    }

    /// Run a group body with registrations redirected to the backstack.
    fn expand(&mut self, parent: RouteId, scope: Scope, body: GroupBody) {
        tracing::debug!(group_id = %parent, prefix = %scope.base_path(), "Expanding group");
        let previous = std::mem::replace(
            &mut self.context,
            RegistrationContext::ExpandingGroup { parent, scope },
        );
        body(self);
        self.context = previous;
    }

    // ===== Resolution =====

    /// Route the captured request.
    ///
    /// Top-level entries are tried in registration order. After each one, every
    /// entry its group expansion queued is resolved before moving on, so the
    /// backstack is always empty when the next top-level entry starts.
    pub fn route_request(&mut self) -> Result<Outcome, RouterError> {
        tracing::debug!(
            method = %self.request.method(),
            path = %self.request.path(),
            routes = self.routes.len(),
            "Routing request"
        );

        for index in 0..self.routes.len() {
            let id = self.routes[index].id;
            let scope = Scope::root().enter(&self.routes[index].entry);

            let outcome = self.routes[index].entry.try_match(&self.request, &scope);
            if let Some(output) = self.settle(id, scope, outcome)? {
                return Ok(Outcome::Dispatched(output));
            }

            if let Some(output) = self.resolve_backstack()? {
                return Ok(Outcome::Dispatched(output));
            }
        }

        tracing::debug!(path = %self.request.path(), "No route matched");
        Ok(Outcome::NotFound)
    }

    /// Drain the backstack front to back, dispatching the first match.
    fn resolve_backstack(&mut self) -> Result<Option<String>, RouterError> {
        while let Some(Pending { id, mut entry, parent }) = self.backstack.pop_front() {
            let scope = parent.enter(&entry);

            // Groups keep their own URL so descendants are not prefixed twice.
            if entry.kind() == EntryKind::Route {
                entry.set_settings(scope.settings().clone());
                let url = scope.qualify(entry.url());
                entry.set_url(url);
            }

            let outcome = entry.try_match(&self.request, &scope);
            let settled = self.settle(id, scope, outcome);
            if !matches!(settled, Ok(None)) {
                self.backstack.clear();
                return settled;
            }
        }
        Ok(None)
    }

    fn settle(
        &mut self,
        id: RouteId,
        scope: Scope,
        outcome: MatchOutcome,
    ) -> Result<Option<String>, RouterError> {
        match outcome {
            MatchOutcome::Matched(route) => {
                tracing::debug!(route_id = %id, url = %route.url, "Route matched");
                self.dispatch(route).map(Some)
            }
            MatchOutcome::Expand(body) => {
                self.expand(id, scope, body);
                Ok(None)
            }
            MatchOutcome::Miss => Ok(None),
        }
    }

    // ===== Dispatch =====

    /// Run middleware, then invoke the route's callback with its parameters.
    pub fn dispatch(&mut self, route: ResolvedRoute) -> Result<String, RouterError> {
        tracing::info!(url = %route.url, callback = ?route.callback, "Dispatching route");
        self.current_route = Some(route.clone());

        if let Some(middleware) = &route.middleware {
            tracing::debug!(middleware = %middleware, "Loading middleware");
            let factory = self.registry.resolve(middleware)?;
            factory(&route).map_err(|source| RouterError::Middleware {
                name: middleware.clone(),
                source,
            })?;
        }

        let output = match &route.callback {
            Callback::Function(handler) => handler(&route.parameters),
            Callback::Method { class, method } => {
                let name = qualify_class(route.namespace.as_deref(), class);
                let factory = self.registry.resolve(&name)?;
                let instance = factory(&route).map_err(RouterError::Handler)?;

                let loaded = self.loaded_class.insert(LoadedClass { name, instance });
                if !loaded.instance.has_method(method) {
                    return Err(RouterError::MethodNotFound {
                        class: loaded.name.clone(),
                        method: method.clone(),
                    });
                }

                loaded.instance.invoke(method, &route.parameters)
            }
        };

        output.map_err(RouterError::Handler)
    }

    // ===== Accessors =====

    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Namespace given to entries registered without one. Affects later registrations only.
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Top-level entries in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Entry> {
        self.routes.iter().map(|r| &r.entry)
    }

    /// Entries queued by group expansion and not yet resolved.
    pub fn backstack(&self) -> impl Iterator<Item = &Entry> {
        self.backstack.iter().map(|p| &p.entry)
    }

    /// The route most recently handed to [`dispatch`](Self::dispatch).
    pub fn current_route(&self) -> Option<&ResolvedRoute> {
        self.current_route.as_ref()
    }

    /// The controller instantiated by the last `Class@method` dispatch.
    pub fn loaded_class(&self) -> Option<&LoadedClass> {
        self.loaded_class.as_ref()
    }

    pub fn registration_context(&self) -> &RegistrationContext {
        &self.context
    }

    pub fn request(&self) -> &RequestTarget {
        &self.request
    }

    pub fn request_method(&self) -> &str {
        self.request.method()
    }

    pub fn request_path(&self) -> &str {
        self.request.path()
    }
}
