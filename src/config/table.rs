//! Route tables built from configuration.
//!
//! A `RouteTable` is compiled once at startup and replayed into every
//! per-request router, so registration never fails while serving.

use std::sync::Arc;

use crate::config::schema::{RouteConfig, RouterConfig};
use crate::routing::{Route, Router, RouterError, Settings};

#[derive(Debug, Clone)]
enum TableEntry {
    Route(Route),
    Group {
        prefix: Option<String>,
        namespace: Option<String>,
        middleware: Option<String>,
        settings: Settings,
        children: Arc<[TableEntry]>,
    },
}

/// Compiled registrations for a whole configuration.
#[derive(Debug, Clone)]
pub struct RouteTable {
    default_namespace: Option<String>,
    entries: Arc<[TableEntry]>,
}

impl RouteTable {
    /// Compile the route tree of `config`, parsing every callback.
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouterError> {
        Ok(Self {
            default_namespace: config.default_namespace.clone(),
            entries: compile(&config.routes)?,
        })
    }

    /// Register every entry into `router`.
    pub fn register(&self, router: &mut Router) {
        if let Some(namespace) = &self.default_namespace {
            router.set_default_namespace(namespace.clone());
        }
        register_all(&self.entries, router);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compile(routes: &[RouteConfig]) -> Result<Arc<[TableEntry]>, RouterError> {
    routes.iter().map(compile_one).collect()
}

fn compile_one(config: &RouteConfig) -> Result<TableEntry, RouterError> {
    let Some(callback) = &config.callback else {
        return Ok(TableEntry::Group {
            prefix: config.prefix.clone(),
            namespace: config.namespace.clone(),
            middleware: config.middleware.clone(),
            settings: config.settings.clone(),
            children: compile(&config.routes)?,
        });
    };

    let mut route = Route::new(config.url.clone().unwrap_or_default(), callback.parse()?);
    if !config.methods.is_empty() {
        route.methods(&config.methods);
    }
    if let Some(prefix) = &config.prefix {
        route.set_prefix(prefix);
    }
    if let Some(namespace) = &config.namespace {
        route.set_namespace(namespace.clone());
    }
    if let Some(middleware) = &config.middleware {
        route.set_middleware(middleware.clone());
    }
    for (key, value) in &config.settings {
        route.setting(key.clone(), value.clone());
    }
    Ok(TableEntry::Route(route))
}

fn register_all(entries: &[TableEntry], router: &mut Router) {
    for entry in entries {
        match entry {
            TableEntry::Route(route) => {
                router.add_route(route.clone());
            }
            TableEntry::Group {
                prefix,
                namespace,
                middleware,
                settings,
                children,
            } => {
                let nested = Arc::clone(children);
                let group = router.group(move |r| register_all(&nested, r));
                if let Some(prefix) = prefix {
                    group.set_prefix(prefix);
                }
                if let Some(namespace) = namespace {
                    group.set_namespace(namespace.clone());
                }
                if let Some(middleware) = middleware {
                    group.set_middleware(middleware.clone());
                }
                for (key, value) in settings {
                    group.setting(key.clone(), value.clone());
                }
            }
        }
    }
}
