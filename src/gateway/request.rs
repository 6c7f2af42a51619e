//! Event decoding
//!
//! Turns an [`InvocationEvent`] into the [`CanonicalRequest`] consumed by the
//! router. The body is always materialized as raw bytes: a text event body
//! contributes its UTF-8 bytes, an event flagged `isBase64Encoded`
//! contributes its decoded bytes. Conversion back to text happens only where
//! a handler needs text.
//!
//! Query data is never URL-decoded here. A raw query string reaches the
//! router verbatim and a pre-parsed map reaches it as a map.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::body::Bytes;
use hyper::Method;
use std::collections::BTreeMap;
use thiserror::Error;

use super::event::{InvocationEvent, QueryInput};

/// Failure to turn an event into a request
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
    #[error("Invalid base64 body: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Query data passed through to the router
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Query {
    #[default]
    Absent,
    /// Undecoded query text, e.g. `a=1&b=%20`
    Raw(String),
    Params(BTreeMap<String, String>),
}

impl Query {
    /// Rendering used by the access log; `None` when there is no query
    pub fn display(&self) -> Option<String> {
        match self {
            Self::Absent => None,
            Self::Raw(raw) => Some(raw.clone()),
            Self::Params(params) => Some(
                params
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<_>>()
                    .join("&"),
            ),
        }
    }
}

impl From<Option<QueryInput>> for Query {
    fn from(input: Option<QueryInput>) -> Self {
        match input {
            None => Self::Absent,
            Some(QueryInput::Raw(raw)) if raw.is_empty() => Self::Absent,
            Some(QueryInput::Raw(raw)) => Self::Raw(raw),
            Some(QueryInput::Params(params)) if params.is_empty() => Self::Absent,
            Some(QueryInput::Params(params)) => Self::Params(params),
        }
    }
}

/// Normalized HTTP-like request
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    pub method: Method,
    pub path: String,
    /// Keys in canonical form, see [`normalize_header_key`]
    pub headers: BTreeMap<String, String>,
    pub content_type: String,
    /// Always `body.len()`; never taken from the event's own headers
    pub content_length: usize,
    pub body: Bytes,
    pub query: Query,
}

impl CanonicalRequest {
    /// Header lookup by any spelling of the name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&normalize_header_key(name))
            .map(String::as_str)
    }

    /// Body as UTF-8 text
    pub fn body_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// One-line description for error logs, e.g. `POST /api/save?v=1 (12 bytes, curl/8.5)`
    pub fn summary(&self) -> String {
        let mut line = format!("{} {}", self.method, self.path);
        if let Some(query) = self.query.display() {
            line.push('?');
            line.push_str(&query);
        }
        line.push_str(&format!(" ({} bytes", self.content_length));
        if let Some(agent) = self.header("user-agent") {
            line.push_str(", ");
            line.push_str(agent);
        }
        line.push(')');
        line
    }
}

/// Canonical header key: upper-cased with `-` replaced by `_`.
///
/// Applying it to an already canonical key returns the key unchanged.
pub fn normalize_header_key(key: &str) -> String {
    key.to_ascii_uppercase().replace('-', "_")
}

/// Decode an invocation event into a canonical request
pub fn decode(event: InvocationEvent) -> Result<CanonicalRequest, DecodeError> {
    let content_type = event.header("content-type").unwrap_or_default().to_string();
    let query = Query::from(event.query());

    let method = match event.method.as_deref() {
        None | Some("") => Method::GET,
        Some(raw) => Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
            .map_err(|_| DecodeError::InvalidMethod(raw.to_string()))?,
    };

    let path = match event.path {
        Some(path) if !path.is_empty() => path,
        _ => "/".to_string(),
    };

    let headers = event
        .headers
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (normalize_header_key(&key), value))
        .collect();

    let body = match event.body {
        None => Bytes::new(),
        Some(body) if event.is_base64_encoded => Bytes::from(STANDARD.decode(body)?),
        Some(body) => Bytes::from(body),
    };

    Ok(CanonicalRequest {
        method,
        path,
        headers,
        content_type,
        content_length: body.len(),
        body,
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_event() {
        let req = decode(InvocationEvent::default()).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path, "/");
        assert!(req.headers.is_empty());
        assert_eq!(req.content_type, "");
        assert_eq!(req.content_length, 0);
        assert!(req.body.is_empty());
        assert_eq!(req.query, Query::Absent);
    }

    #[test]
    fn test_normalize_header_key() {
        assert_eq!(normalize_header_key("content-type"), "CONTENT_TYPE");
        assert_eq!(normalize_header_key("X-Forwarded-For"), "X_FORWARDED_FOR");
        for key in ["user-agent", "User-Agent", "USER_AGENT", "x-a-b-c"] {
            let once = normalize_header_key(key);
            assert_eq!(normalize_header_key(&once), once);
        }
    }

    #[test]
    fn test_headers_normalized_and_content_type_found() {
        let event = InvocationEvent::new("post", "/api/save")
            .with_header("Content-Type", "application/json")
            .with_header("x-request-id", "abc");
        let req = decode(event).unwrap();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.content_type, "application/json");
        assert_eq!(req.headers.get("CONTENT_TYPE").unwrap(), "application/json");
        assert_eq!(req.headers.get("X_REQUEST_ID").unwrap(), "abc");
        assert_eq!(req.header("X-Request-Id"), Some("abc"));
    }

    #[test]
    fn test_content_length_ignores_event_header() {
        let event = InvocationEvent::new("POST", "/api/save")
            .with_header("Content-Length", "999")
            .with_body("héllo");
        let req = decode(event).unwrap();
        assert_eq!(req.content_length, "héllo".len());
        assert_eq!(req.content_length, req.body.len());
        assert_eq!(req.body_text().unwrap(), "héllo");
    }

    #[test]
    fn test_base64_body() {
        let mut event = InvocationEvent::new("POST", "/api/save").with_body("aGVsbG8=");
        event.is_base64_encoded = true;
        let req = decode(event).unwrap();
        assert_eq!(&req.body[..], b"hello");
        assert_eq!(req.content_length, 5);
    }

    #[test]
    fn test_invalid_base64_body() {
        let mut event = InvocationEvent::new("POST", "/api/save").with_body("not base64!");
        event.is_base64_encoded = true;
        assert!(matches!(decode(event), Err(DecodeError::InvalidBase64(_))));
    }

    #[test]
    fn test_invalid_method() {
        let event = InvocationEvent::new("GE T", "/");
        assert!(matches!(decode(event), Err(DecodeError::InvalidMethod(_))));
    }

    #[test]
    fn test_raw_query_passed_through_undecoded() {
        let event = InvocationEvent::new("GET", "/")
            .with_query(QueryInput::Raw("name=a%20b&x=1".to_string()));
        let req = decode(event).unwrap();
        assert_eq!(req.query, Query::Raw("name=a%20b&x=1".to_string()));
        assert_eq!(req.query.display().as_deref(), Some("name=a%20b&x=1"));
    }

    #[test]
    fn test_parsed_query_kept_as_map() {
        let params = BTreeMap::from([
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]);
        let event = InvocationEvent::new("GET", "/").with_query(QueryInput::Params(params.clone()));
        let req = decode(event).unwrap();
        assert_eq!(req.query, Query::Params(params));
        assert_eq!(req.query.display().as_deref(), Some("a=1&b=2"));
    }

    #[test]
    fn test_summary() {
        let event = InvocationEvent::new("POST", "/api/save")
            .with_header("User-Agent", "curl/8.5")
            .with_query(QueryInput::Raw("v=1".to_string()))
            .with_body("hello");
        assert_eq!(
            decode(event).unwrap().summary(),
            "POST /api/save?v=1 (5 bytes, curl/8.5)"
        );
        let bare = decode(InvocationEvent::new("GET", "/")).unwrap();
        assert_eq!(bare.summary(), "GET / (0 bytes)");
    }

    #[test]
    fn test_empty_query_is_absent() {
        let event = InvocationEvent::new("GET", "/").with_query(QueryInput::Raw(String::new()));
        assert_eq!(decode(event).unwrap().query, Query::Absent);
    }
}
