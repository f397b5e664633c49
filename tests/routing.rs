//! End-to-end routing tests through the public API.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use group_router::config::{parse_config, RouteTable};
use group_router::routing::{
    Callback, Entry, Group, RegistrationContext, RequestTarget, Route, RouteEntry, Router,
    RouterError,
};
use group_router::Outcome;
use serde_json::json;

mod common;

fn router_for(method: &str, uri: &str) -> Router {
    let (registry, _, _) = common::recording_registry();
    Router::new(RequestTarget::new(method, uri), Arc::new(registry))
}

#[test]
fn test_add_route_outside_group_is_top_level() {
    let mut router = router_for("GET", "/");

    let mut first = Route::new("/one", Callback::method("UserController", "index"));
    first.methods(["get"]);
    let a = router.add_route(first);
    let b = router.add_route(Route::new("/two", Callback::method("UserController", "index")));

    assert!(a < b);
    assert_eq!(router.registration_context(), &RegistrationContext::TopLevel);
    let urls: Vec<_> = router.routes().map(|e| e.url().to_string()).collect();
    assert_eq!(urls, vec!["/one", "/two"]);
    assert_eq!(router.backstack().count(), 0);
}

#[test]
fn test_api_users_resolves_nested_child() {
    let mut router = router_for("GET", "/api/users");
    router.set_default_namespace("App\\Controllers");

    let mut api = Group::new(|r: &mut Router| {
        r.get("/users", "UserController@index".parse().unwrap());
    });
    api.set_prefix("api");
    router.add_route(api);

    assert_eq!(
        router.route_request().unwrap(),
        Outcome::Dispatched("index()".into())
    );
    assert_eq!(router.current_route().unwrap().url, "/api/users");
    assert_eq!(
        router.loaded_class().unwrap().name(),
        "App\\Controllers\\UserController"
    );
}

#[test]
fn test_controller_receives_parameters_in_order() {
    let (registry, calls, _) = common::recording_registry();
    let mut router = Router::new(
        RequestTarget::new("GET", "/users/3/posts/9/"),
        Arc::new(registry),
    );
    router.set_default_namespace("App\\Controllers");
    router.route("/users/{user}/posts/{post}", Callback::method("UserController", "show"));

    router.route_request().unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![("show".to_string(), vec!["3".to_string(), "9".to_string()])]
    );
}

#[test]
fn test_middleware_runs_before_controller() {
    let (registry, calls, audits) = common::recording_registry();
    let mut router = Router::new(RequestTarget::new("GET", "/admin/users/1"), Arc::new(registry));
    router.set_default_namespace("App\\Controllers");
    router
        .group(|r| {
            r.route("/users/{id}", Callback::method("UserController", "show"));
        })
        .set_prefix("admin")
        .set_middleware("\\Audit");

    router.route_request().unwrap();

    assert_eq!(audits.load(Ordering::SeqCst), 1);
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn test_missing_controller_class_is_fatal() {
    let mut router = router_for("GET", "/reports");
    router.route("/reports", Callback::method("ReportController", "index"));
    router.route("/reports", Callback::from_fn(|_| Ok("fallback".into())));

    let err = router.route_request().unwrap_err();
    assert!(matches!(err, RouterError::ClassNotFound(ref name) if name == "ReportController"));
}

#[test]
fn test_custom_entry_types_participate() {
    #[derive(Debug)]
    struct Always;

    impl RouteEntry for Always {
        fn kind(&self) -> group_router::routing::EntryKind {
            group_router::routing::EntryKind::Route
        }
        fn prefix(&self) -> Option<&str> {
            None
        }
        fn namespace(&self) -> Option<&str> {
            None
        }
        fn set_namespace(&mut self, _namespace: String) {}
        fn middleware(&self) -> Option<&str> {
            None
        }
        fn callback(&self) -> Option<&Callback> {
            None
        }
        fn parameters(&self) -> &[String] {
            &[]
        }
        fn mergeable_settings(&self) -> group_router::routing::Settings {
            Default::default()
        }
        fn set_settings(&mut self, _settings: group_router::routing::Settings) {}
        fn url(&self) -> &str {
            "*"
        }
        fn set_url(&mut self, _url: String) {}
        fn try_match(
            &mut self,
            _request: &RequestTarget,
            _scope: &group_router::routing::Scope,
        ) -> group_router::routing::MatchOutcome {
            group_router::routing::MatchOutcome::Matched(group_router::routing::ResolvedRoute {
                url: "*".into(),
                namespace: None,
                middleware: None,
                callback: Callback::from_fn(|_| Ok("catch-all".into())),
                parameters: vec![],
                settings: Default::default(),
            })
        }
    }

    let mut router = router_for("GET", "/anything/at/all");
    router.add_route(Entry::Custom(Box::new(Always)));

    assert_eq!(
        router.route_request().unwrap(),
        Outcome::Dispatched("catch-all".into())
    );
}

#[test]
fn test_route_table_from_toml() {
    let config = parse_config(
        r#"
default_namespace = "App\\Controllers"

[[routes]]
prefix = "api"
settings = { auth = false, version = 1 }

[[routes.routes]]
prefix = "v2"
settings = { version = 2 }

[[routes.routes.routes]]
url = "/users/{id}"
callback = "UserController@show"
methods = ["get"]
settings = { auth = true }
"#,
    )
    .unwrap();
    let table = RouteTable::from_config(&config).unwrap();

    let mut router = router_for("GET", "/api/v2/users/11");
    table.register(&mut router);

    assert_eq!(
        router.route_request().unwrap(),
        Outcome::Dispatched("show(11)".into())
    );
    let current = router.current_route().unwrap();
    assert_eq!(current.url, "/api/v2/users/{id}");
    assert_eq!(current.settings["auth"], json!(true));
    assert_eq!(current.settings["version"], json!(2));

    // A fresh router per request: nothing carried over
    let mut next = router_for("POST", "/api/v2/users/11");
    table.register(&mut next);
    assert_eq!(next.route_request().unwrap(), Outcome::NotFound);
}
