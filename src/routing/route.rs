//! Concrete routes.
//!
//! # Responsibilities
//! - Match a request method against an optional allow-list
//! - Match a request path against a segment pattern
//! - Capture path parameters in pattern order
//!
//! # Design Decisions
//! - Segments are literals, `{name}` or a trailing `{name?}`
//! - Literal comparison is case-sensitive
//! - Trailing and repeated slashes are ignored on both sides
//! - No regex: matching is a single pass over the segments

use serde_json::Value;

use crate::routing::entry::{
    Callback, EntryKind, MatchOutcome, ResolvedRoute, RouteEntry, Scope, Settings,
    MIDDLEWARE_KEY, NAMESPACE_KEY,
};
use crate::routing::request::RequestTarget;

/// A route bound to a URL pattern and a callback.
#[derive(Debug, Clone)]
pub struct Route {
    url: String,
    methods: Vec<String>,
    callback: Callback,
    prefix: Option<String>,
    namespace: Option<String>,
    middleware: Option<String>,
    settings: Settings,
    effective: Option<Settings>,
    parameters: Vec<String>,
}

impl Route {
    /// Create a route answering any method on `url`.
    pub fn new(url: impl Into<String>, callback: Callback) -> Self {
        Self {
            url: url.into(),
            methods: Vec::new(),
            callback,
            prefix: None,
            namespace: None,
            middleware: None,
            settings: Settings::new(),
            effective: None,
            parameters: Vec::new(),
        }
    }

    /// Restrict the route to the given methods (case-insensitive).
    pub fn methods<I, S>(&mut self, methods: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_lowercase())
            .collect();
        self
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

    /// Attach a setting, visible in the effective settings at dispatch.
    pub fn setting(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Effective settings, once an ancestor chain has been applied.
    pub fn settings(&self) -> Option<&Settings> {
        self.effective.as_ref()
    }

    fn resolve(&self) -> ResolvedRoute {
        ResolvedRoute {
            url: self.url.clone(),
            namespace: self.namespace.clone(),
            middleware: self.middleware.clone(),
            callback: self.callback.clone(),
            parameters: self.parameters.clone(),
            settings: self
                .effective
                .clone()
                .unwrap_or_else(|| self.mergeable_settings()),
        }
    }
}

impl RouteEntry for Route {
    fn kind(&self) -> EntryKind {
        EntryKind::Route
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
        Some(&self.callback)
    }

    fn parameters(&self) -> &[String] {
        &self.parameters
    }

    fn mergeable_settings(&self) -> Settings {
        own_settings(&self.settings, self.namespace.as_deref(), self.middleware.as_deref())
    }

    fn set_settings(&mut self, settings: Settings) {
        if let Some(Value::String(namespace)) = settings.get(NAMESPACE_KEY) {
            self.namespace = Some(namespace.clone());
        }
        if let Some(Value::String(middleware)) = settings.get(MIDDLEWARE_KEY) {
            self.middleware = Some(middleware.clone());
        }
        self.effective = Some(settings);
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn set_url(&mut self, url: String) {
        self.url = url;
    }

    fn try_match(&mut self, request: &RequestTarget, _scope: &Scope) -> MatchOutcome {
        if !self.methods.is_empty() && !self.methods.iter().any(|m| m == request.method()) {
            return MatchOutcome::Miss;
        }

        match match_path(&self.url, request.path()) {
            Some(parameters) => {
                self.parameters = parameters;
                MatchOutcome::Matched(self.resolve())
            }
            None => MatchOutcome::Miss,
        }
    }
}

/// Build the settings an entry hands down, folding in namespace and middleware.
pub(crate) fn own_settings(
    settings: &Settings,
    namespace: Option<&str>,
    middleware: Option<&str>,
) -> Settings {
    let mut merged = settings.clone();
    if let Some(namespace) = namespace {
        merged.insert(NAMESPACE_KEY.to_string(), Value::from(namespace));
    }
    if let Some(middleware) = middleware {
        merged.insert(MIDDLEWARE_KEY.to_string(), Value::from(middleware));
    }
    merged
}

/// Strip surrounding slashes; an empty prefix is no prefix.
pub(crate) fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Param { optional: bool },
}

fn parse_segment(segment: &str) -> Segment<'_> {
    match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(name) => Segment::Param {
            optional: name.ends_with('?'),
        },
        None => Segment::Literal(segment),
    }
}

/// Match `path` against `pattern`, returning captured parameters.
pub(crate) fn match_path(pattern: &str, path: &str) -> Option<Vec<String>> {
    let mut pattern_segments = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segments = path.split('/').filter(|s| !s.is_empty());
    let mut parameters = Vec::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(parameters),
            (None, Some(_)) => return None,
            (Some(segment), None) => match parse_segment(segment) {
                Segment::Param { optional: true } => continue,
                _ => return None,
            },
            (Some(segment), Some(value)) => match parse_segment(segment) {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Param { .. } => parameters.push(value.to_string()),
            },
        }
    }
}

/// Whether `path` starts with every segment of `prefix`, under the same
/// rules as [`match_path`]. Extra path segments are allowed.
pub(crate) fn match_prefix(prefix: &str, path: &str) -> bool {
    let mut path_segments = path.split('/').filter(|s| !s.is_empty());

    for segment in prefix.split('/').filter(|s| !s.is_empty()) {
        match (parse_segment(segment), path_segments.next()) {
            (Segment::Literal(literal), Some(value)) if literal == value => {}
            (Segment::Literal(_), _) => return false,
            (Segment::Param { .. }, Some(_)) => {}
            (Segment::Param { optional }, None) => return optional,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok() -> Callback {
        Callback::from_fn(|_| Ok(String::new()))
    }

    #[test]
    fn test_match_path_literals() {
        assert_eq!(match_path("/users", "/users"), Some(vec![]));
        assert_eq!(match_path("/users/", "/users"), Some(vec![]));
        assert_eq!(match_path("/", ""), Some(vec![]));
        assert_eq!(match_path("/users", "/Users"), None);
        assert_eq!(match_path("/users", "/users/1"), None);
    }

    #[test]
    fn test_match_path_parameters() {
        assert_eq!(
            match_path("/users/{id}/posts/{post}", "/users/7/posts/42"),
            Some(vec!["7".to_string(), "42".to_string()])
        );
        assert_eq!(match_path("/users/{id}", "/users"), None);
        assert_eq!(
            match_path("/pages/{slug?}", "/pages/about"),
            Some(vec!["about".to_string()])
        );
        assert_eq!(match_path("/pages/{slug?}", "/pages"), Some(vec![]));
    }

    #[test]
    fn test_match_prefix() {
        assert!(match_prefix("", "/anything"));
        assert!(match_prefix("/api", "/api"));
        assert!(match_prefix("/api", "/api/users"));
        assert!(match_prefix("/api", "//api/users"));
        assert!(!match_prefix("/api", "/apis"));
        assert!(!match_prefix("/api/v1", "/api"));
        assert!(match_prefix("/users/{id}", "/users/5/posts"));
        assert!(!match_prefix("/users/{id}", "/users"));
        assert!(match_prefix("/pages/{slug?}", "/pages"));
    }

    #[test]
    fn test_method_restriction() {
        let mut route = Route::new("/users", ok());
        route.methods(["GET", "post"]);

        let get = RequestTarget::new("GET", "/users");
        let delete = RequestTarget::new("DELETE", "/users");

        assert!(matches!(route.try_match(&get, &Scope::root()), MatchOutcome::Matched(_)));
        assert!(matches!(route.try_match(&delete, &Scope::root()), MatchOutcome::Miss));
    }

    #[test]
    fn test_try_match_sets_parameters() {
        let mut route = Route::new("/users/{id}", ok());
        let req = RequestTarget::new("GET", "/users/9");

        match route.try_match(&req, &Scope::root()) {
            MatchOutcome::Matched(resolved) => assert_eq!(resolved.parameters, vec!["9"]),
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(route.parameters(), &["9".to_string()]);
    }

    #[test]
    fn test_set_settings_applies_inherited_fields() {
        let mut route = Route::new("/users", ok());
        route.setting("auth", true);

        let inherited = json!({"namespace": "Admin", "middleware": "Auth", "auth": true})
            .as_object()
            .cloned()
            .unwrap();
        route.set_settings(inherited);

        assert_eq!(route.namespace(), Some("Admin"));
        assert_eq!(RouteEntry::middleware(&route), Some("Auth"));
        assert_eq!(route.settings().unwrap()["auth"], json!(true));
    }
}
