//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use group_router::config::RouterConfig;
use group_router::routing::{ClassRegistry, Controller, HandlerResult};
use group_router::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// A controller that records every call it receives.
#[allow(dead_code)]
pub struct RecordingController {
    pub calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl Controller for RecordingController {
    fn has_method(&self, method: &str) -> bool {
        matches!(method, "show" | "index")
    }

    fn invoke(&mut self, method: &str, parameters: &[String]) -> HandlerResult {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), parameters.to_vec()));
        Ok(format!("{}({})", method, parameters.join(",")))
    }
}

/// Registry with a recording `App\Controllers\UserController` and a counting
/// `Audit` middleware.
#[allow(dead_code)]
pub fn recording_registry() -> (ClassRegistry, Arc<Mutex<Vec<(String, Vec<String>)>>>, Arc<AtomicUsize>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let audits = Arc::new(AtomicUsize::new(0));

    let mut registry = ClassRegistry::new();
    let recorded = calls.clone();
    registry.register("App\\Controllers\\UserController", move |_| {
        Ok(Box::new(RecordingController {
            calls: recorded.clone(),
        }) as Box<dyn Controller>)
    });
    let counter = audits.clone();
    registry.register_middleware("Audit", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    (registry, calls, audits)
}

/// Start the HTTP server on an ephemeral port and return its address.
#[allow(dead_code)]
pub async fn start_server(config: RouterConfig, registry: ClassRegistry) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, registry).unwrap();
    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    // Give the accept loop a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}
