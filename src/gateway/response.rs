// Response encoding module
// Canonical response type and its translation into the invocation reply

use hyper::body::Bytes;
use hyper::StatusCode;
use std::collections::BTreeMap;

use super::event::InvocationReply;
use crate::logger;

/// Normalized HTTP-like response produced by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalResponse {
    pub status: StatusCode,
    /// Ordered header pairs; a name may appear more than once
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl CanonicalResponse {
    pub const fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Last value for `name`, compared case-insensitively
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Encode a canonical response as an invocation reply.
///
/// Header pairs collapse into a map where the last occurrence of a name
/// wins, so repeated headers keep only their final value. The body is
/// decoded as UTF-8; handlers only ever produce text, and anything else is
/// replaced lossily and logged.
pub fn encode(response: CanonicalResponse) -> InvocationReply {
    let headers: BTreeMap<String, String> = response.headers.into_iter().collect();

    let body = match String::from_utf8(response.body.to_vec()) {
        Ok(text) => text,
        Err(e) => {
            logger::log_warning(&format!(
                "Response body is not valid UTF-8 ({e}); replacing invalid bytes"
            ));
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    InvocationReply {
        status_code: response.status.as_u16(),
        headers,
        body,
    }
}
