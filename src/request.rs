use std::time::Duration;

use reqwest::{Method, Url};

use crate::QiibraryError;

/// Everything needed to issue one logical API call.
///
/// A descriptor is never mutated by the client or the retry loop, so the same
/// value is re-sent verbatim on every attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the client's base URL, e.g. `/api/rankings/`.
    pub path: String,
    /// Identifier segments appended after `path`, percent-encoded one by one.
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Overrides the client's default timeout for this call.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Appends one path segment; `/`, `?`, `#` and friends are encoded, so the
    /// value can never leave its segment.
    pub fn segment(mut self, value: impl ToString) -> Self {
        self.segments.push(value.to_string());
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Joins a base URL and a request path with exactly one slash between them.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Resolves the absolute URL of `descriptor` against `base_url`.
pub(crate) fn build_url(base_url: &str, descriptor: &RequestDescriptor) -> Result<Url, QiibraryError> {
    let joined = join_url(base_url, &descriptor.path);
    let mut url = Url::parse(&joined)
        .map_err(|err| QiibraryError::InvalidRequest(format!("bad url '{joined}': {err}")))?;

    if !descriptor.segments.is_empty() {
        // Dot segments are dropped by the URL parser and would address the parent.
        if let Some(bad) = descriptor
            .segments
            .iter()
            .find(|segment| matches!(segment.as_str(), "" | "." | ".."))
        {
            return Err(QiibraryError::InvalidRequest(format!(
                "invalid path segment '{bad}'"
            )));
        }
        url.path_segments_mut()
            .map_err(|_| QiibraryError::InvalidRequest(format!("'{joined}' cannot carry a path")))?
            .pop_if_empty()
            .extend(&descriptor.segments);
    }

    Ok(url)
}
