//! Request context with typed parameters.

use std::collections::HashMap;

use http::Method;
use rand::Rng;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let salt: u32 = rand::thread_rng().gen();
        Self(format!("{:x}-{:08x}", nanos, salt))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// HTTP headers, keyed by lowercase name.
pub type Headers = HashMap<String, String>;

/// Typed request context passed to workload handlers.
///
/// Built once by the transport adapter (the Spin component, or a test) so
/// handlers never touch the host's request types.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path without the query string.
    pub path: String,
    /// Query string parameters.
    pub query: QueryParams,
    /// HTTP headers.
    pub headers: Headers,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl RequestContext {
    /// Create a new request context from a method and a path that may carry a query string.
    pub fn new(method: Method, path_with_query: impl AsRef<str>) -> Self {
        let raw = path_with_query.as_ref();
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (raw, HashMap::new()),
        };

        Self {
            request_id: RequestId::generate(),
            method,
            path: normalize_path(path),
            query,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Reuse an upstream request ID (e.g. from `x-request-id`).
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// Query flag: `?force=true` or `?force=1`.
    pub fn query_flag(&self, name: &str) -> bool {
        matches!(self.query_param(name), Some("true") | Some("1"))
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    /// Get a cookie value from the `Cookie` header.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.header("cookie")?.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then_some(value)
        })
    }

    /// Get the credential of an `Authorization: <scheme> <credential>` header.
    ///
    /// The scheme comparison is case-insensitive.
    pub fn authorization(&self, scheme: &str) -> Option<&str> {
        let value = self.header("authorization")?;
        let (found, credential) = value.trim().split_once(' ')?;
        if found.eq_ignore_ascii_case(scheme) {
            Some(credential.trim()).filter(|c| !c.is_empty())
        } else {
            None
        }
    }

    /// Shorthand for a `Bearer` credential.
    pub fn bearer_token(&self) -> Option<&str> {
        self.authorization("Bearer")
    }
}

fn parse_query(query: &str) -> QueryParams {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing() {
        let ctx = RequestContext::new(
            Method::POST,
            "/api/admin/sync-inventory?productId=castle%2Dtee&force=true",
        );
        assert_eq!(ctx.path, "/api/admin/sync-inventory");
        assert_eq!(ctx.query_param("productId"), Some("castle-tee"));
        assert!(ctx.query_flag("force"));
        assert!(!ctx.query_flag("missing"));
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let ctx = RequestContext::new(Method::GET, "/api/cron/sync-inventory/");
        assert_eq!(ctx.path, "/api/cron/sync-inventory");

        let root = RequestContext::new(Method::GET, "/");
        assert_eq!(root.path, "/");
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let ctx = RequestContext::new(Method::GET, "/").with_header("X-Request-Id", "abc");
        assert_eq!(ctx.header("x-request-id"), Some("abc"));
        assert_eq!(ctx.header("X-REQUEST-ID"), Some("abc"));
    }

    #[test]
    fn test_cookie_lookup() {
        let ctx = RequestContext::new(Method::GET, "/")
            .with_header("Cookie", "theme=dark; session_id=sess_123; lang=en");
        assert_eq!(ctx.cookie("session_id"), Some("sess_123"));
        assert_eq!(ctx.cookie("lang"), Some("en"));
        assert_eq!(ctx.cookie("missing"), None);
    }

    #[test]
    fn test_bearer_token() {
        let ctx = RequestContext::new(Method::GET, "/").with_header("Authorization", "Bearer s3cret");
        assert_eq!(ctx.bearer_token(), Some("s3cret"));

        let lower = RequestContext::new(Method::GET, "/").with_header("Authorization", "bearer s3cret");
        assert_eq!(lower.bearer_token(), Some("s3cret"));

        let basic = RequestContext::new(Method::GET, "/").with_header("Authorization", "Basic abc");
        assert_eq!(basic.bearer_token(), None);

        let empty = RequestContext::new(Method::GET, "/").with_header("Authorization", "Bearer ");
        assert_eq!(empty.bearer_token(), None);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }
}
