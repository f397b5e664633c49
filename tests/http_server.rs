//! HTTP front-end tests against a live server.

use group_router::builtin::{default_registry, PAGE_CONTROLLER};
use group_router::config::{RouteConfig, RouterConfig};
use serde_json::Value;

mod common;

fn demo_config() -> RouterConfig {
    let mut config = RouterConfig::default();
    config.default_namespace = Some("App\\Controllers".into());
    config.routes.push(RouteConfig {
        url: Some("/".into()),
        callback: Some("PageController@index".into()),
        methods: vec!["get".into()],
        ..Default::default()
    });
    config.routes.push(RouteConfig {
        prefix: Some("pages".into()),
        middleware: Some("App\\Middleware\\RequestLogger".into()),
        routes: vec![
            RouteConfig {
                url: Some("/{slug}".into()),
                callback: Some("PageController@show".into()),
                ..Default::default()
            },
            RouteConfig {
                url: Some("/{slug}/edit".into()),
                callback: Some("PageController@destroy".into()),
                ..Default::default()
            },
        ],
        ..Default::default()
    });
    config
}

#[tokio::test]
async fn test_dispatch_over_http() {
    let (addr, shutdown) = common::start_server(demo_config(), default_registry()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/pages/about", addr))
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["method"], "show");
    assert_eq!(body["parameters"][0], "about");

    let res = client.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unmatched_request_is_404() {
    let (addr, shutdown) = common::start_server(demo_config(), default_registry()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("http://{}/missing/page", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    // Method restriction on "/" leaves POST unmatched
    let res = client.post(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_dispatch_failures_are_500() {
    let (addr, shutdown) = common::start_server(demo_config(), default_registry()).await;
    assert!(default_registry().contains(PAGE_CONTROLLER));

    // PageController has no `destroy` method
    let res = reqwest::get(format!("http://{}/pages/about/edit", addr))
        .await
        .unwrap();
    assert_eq!(res.status(), 500);

    shutdown.trigger();
}

#[tokio::test]
async fn test_refusing_middleware_is_403() {
    let mut registry = default_registry();
    registry.register_middleware("Deny", |_| Err("not allowed".into()));

    let mut config = demo_config();
    config.routes.insert(
        0,
        RouteConfig {
            url: Some("/private".into()),
            callback: Some("PageController@index".into()),
            middleware: Some("\\Deny".into()),
            ..Default::default()
        },
    );

    let (addr, shutdown) = common::start_server(config, registry).await;
    let res = reqwest::get(format!("http://{}/private", addr)).await.unwrap();
    assert_eq!(res.status(), 403);

    shutdown.trigger();
}
