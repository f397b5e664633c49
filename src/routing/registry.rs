//! Class registry.
//!
//! # Responsibilities
//! - Map fully qualified class names to factories
//! - Instantiate controllers and middleware on demand
//! - Resolve short class names against a namespace
//!
//! # Design Decisions
//! - Explicit registration replaces reflection: a class exists iff it is registered
//! - Factories see the matched route, so middleware can inspect it
//! - Middleware does its work while being constructed; an error aborts dispatch

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::entry::{HandlerResult, ResolvedRoute};
use crate::routing::error::{BoxError, RouterError};

/// Separator between namespace segments and class names.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// An instantiated class exposing callable methods.
pub trait Controller: Send {
    /// Whether `method` can be invoked on this instance.
    fn has_method(&self, method: &str) -> bool;

    /// Invoke `method` with the matched route parameters.
    fn invoke(&mut self, method: &str, parameters: &[String]) -> HandlerResult;
}

/// Builds an instance of a registered class.
pub type ClassFactory =
    Arc<dyn Fn(&ResolvedRoute) -> Result<Box<dyn Controller>, BoxError> + Send + Sync>;

/// Instance produced for middleware classes. Exposes no methods.
struct MiddlewareInstance;

impl Controller for MiddlewareInstance {
    fn has_method(&self, _method: &str) -> bool {
        false
    }

    fn invoke(&mut self, method: &str, _parameters: &[String]) -> HandlerResult {
        Err(format!("middleware has no method {}", method).into())
    }
}

/// Registry of instantiable classes, keyed by fully qualified name.
#[derive(Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassFactory>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class factory under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&ResolvedRoute) -> Result<Box<dyn Controller>, BoxError> + Send + Sync + 'static,
    {
        let name = absolute(name).to_string();
        tracing::trace!(class = %name, "Class registered");
        self.classes.insert(name, Arc::new(factory));
        self
    }

    /// Register a middleware class. `run` executes on every instantiation.
    pub fn register_middleware<F>(&mut self, name: &str, run: F) -> &mut Self
    where
        F: Fn(&ResolvedRoute) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.register(name, move |route| {
            run(route)?;
            Ok(Box::new(MiddlewareInstance) as Box<dyn Controller>)
        })
    }

    /// Whether a class is registered under the fully qualified `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(absolute(name))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Look up the factory registered under the fully qualified `name`.
    pub fn resolve(&self, name: &str) -> Result<&ClassFactory, RouterError> {
        self.classes
            .get(absolute(name))
            .ok_or_else(|| RouterError::ClassNotFound(absolute(name).to_string()))
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.classes.keys().collect();
        names.sort();
        f.debug_struct("ClassRegistry").field("classes", &names).finish()
    }
}

/// Drop a leading separator marking a name as already qualified.
fn absolute(name: &str) -> &str {
    name.trim_start_matches(NAMESPACE_SEPARATOR)
}

/// Qualify `class` with `namespace` unless it is already absolute.
pub fn qualify_class(namespace: Option<&str>, class: &str) -> String {
    if class.starts_with(NAMESPACE_SEPARATOR) {
        return absolute(class).to_string();
    }
    match namespace.map(|ns| ns.trim_matches(NAMESPACE_SEPARATOR)) {
        Some(ns) if !ns.is_empty() => format!("{}{}{}", ns, NAMESPACE_SEPARATOR, class),
        _ => class.to_string(),
    }
}
