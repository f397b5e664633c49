//! Request capture.
//!
//! The router only needs the method and path of the inbound request. Both are
//! normalised once, when the per-request router is built.

/// Query parameter that overrides the transport method (HTML forms can only
/// send GET and POST).
pub const METHOD_OVERRIDE_PARAM: &str = "_method";

/// The normalised method and path of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    method: String,
    path: String,
}

impl RequestTarget {
    /// Capture a request from its method and request URI (path plus optional query).
    pub fn new(method: &str, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        let method = query
            .and_then(method_override)
            .unwrap_or(method)
            .to_lowercase();

        Self {
            method,
            path: path.trim_end_matches('/').to_string(),
        }
    }

    /// Lower-cased request method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path without query string or trailing slash. The root path is `""`.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn method_override(query: &str) -> Option<&str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == METHOD_OVERRIDE_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
