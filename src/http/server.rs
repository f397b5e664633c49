//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single fallback handler
//! - Wire up middleware (tracing, timeout)
//! - Build an isolated request router for every request
//! - Map routing outcomes to HTTP responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{RouteTable, RouterConfig};
use crate::routing::{ClassRegistry, Outcome, RequestTarget, RouterError};
use crate::routing::Router as RequestRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub registry: Arc<ClassRegistry>,
}

impl AppState {
    /// Compile the route table of `config` alongside `registry`.
    pub fn new(config: &RouterConfig, registry: ClassRegistry) -> Result<Self, RouterError> {
        let table = RouteTable::from_config(config)?;

        tracing::info!(
            routes = table.len(),
            classes = registry.len(),
            "Route table compiled"
        );

        Ok(Self {
            table: Arc::new(table),
            registry: Arc::new(registry),
        })
    }
}

/// HTTP server answering requests from a route table.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and classes.
    pub fn new(config: RouterConfig, registry: ClassRegistry) -> Result<Self, RouterError> {
        let state = AppState::new(&config, registry)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Route one request through a router built just for it.
pub fn handle(state: &AppState, method: &str, uri: &str) -> Result<Outcome, RouterError> {
    let mut router = RequestRouter::new(RequestTarget::new(method, uri), Arc::clone(&state.registry));
    state.table.register(&mut router);
    router.route_request()
}

async fn dispatch_handler(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    match handle(&state, method.as_str(), target) {
        Ok(Outcome::Dispatched(body)) => {
            ([(header::CONTENT_TYPE, content_type(&body))], body).into_response()
        }
        Ok(Outcome::NotFound) => {
            tracing::warn!(method = %method, path = %uri.path(), "No route matched");
            (StatusCode::NOT_FOUND, "No matching route found").into_response()
        }
        Err(e @ RouterError::Middleware { .. }) => {
            tracing::warn!(method = %method, path = %uri.path(), error = %e, "Request refused");
            (StatusCode::FORBIDDEN, e.to_string()).into_response()
        }
        Err(e) => {
            tracing::error!(method = %method, path = %uri.path(), error = %e, "Dispatch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// JSON bodies are labelled as such; everything else is plain text.
fn content_type(body: &str) -> &'static str {
    let trimmed = body.trim_start();
    let looks_structured = trimmed.starts_with('{') || trimmed.starts_with('[');
    if looks_structured && serde_json::from_str::<serde_json::Value>(body).is_ok() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::default_registry;
    use crate::config::parse_config;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        let config = parse_config(
            r#"
            default_namespace = "App\\Controllers"

            [[routes]]
            prefix = "pages"

            [[routes.routes]]
            url = "/{slug}"
            callback = "PageController@show"

            [[routes]]
            url = "/ping"
            callback = "PageController@missing"
            "#,
        )
        .unwrap();
        let state = AppState::new(&config, default_registry()).unwrap();
        HttpServer::build_router(&config, state)
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(r#"{"a":1}"#), "application/json");
        assert_eq!(content_type("[1, 2]"), "application/json");
        assert_eq!(content_type("{not json"), "text/plain; charset=utf-8");
        assert_eq!(content_type("hello"), "text/plain; charset=utf-8");
        assert_eq!(content_type("42"), "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_dispatch_serves_json() {
        let response = app()
            .oneshot(Request::get("/pages/about").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_unmatched_and_failing_routes() {
        let missing = app()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let broken = app()
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(broken.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
