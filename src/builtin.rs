//! Built-in classes available to configuration files.
//!
//! These let the binary serve a route table without any application code:
//! `PageController` renders the matched parameters as JSON and
//! `RequestLogger` logs every dispatched route.

use serde_json::json;

use crate::routing::{ClassRegistry, Controller, HandlerResult};

pub const PAGE_CONTROLLER: &str = "App\\Controllers\\PageController";
pub const REQUEST_LOGGER: &str = "App\\Middleware\\RequestLogger";

/// Renders its method name and parameters.
#[derive(Debug, Default)]
pub struct PageController;

impl PageController {
    const METHODS: &'static [&'static str] = &["index", "show", "list"];
}

impl Controller for PageController {
    fn has_method(&self, method: &str) -> bool {
        Self::METHODS.contains(&method)
    }

    fn invoke(&mut self, method: &str, parameters: &[String]) -> HandlerResult {
        let body = json!({
            "controller": "PageController",
            "method": method,
            "parameters": parameters,
        });
        Ok(body.to_string())
    }
}

/// A registry holding the built-in classes.
pub fn default_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register(PAGE_CONTROLLER, |_| {
            Ok(Box::new(PageController) as Box<dyn Controller>)
        })
        .register_middleware(REQUEST_LOGGER, |route| {
            tracing::info!(
                url = %route.url,
                parameters = ?route.parameters,
                "Request reached route"
            );
            Ok(())
        });
    registry
}
