// Invocation event module
// Wire shapes of the per-call event and the reply handed back to the host

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inbound invocation event.
///
/// Every field may be missing or `null`. Field aliases accept the shapes
/// produced by the common function-hosting gateways (`httpMethod`,
/// `rawPath`). Query data may arrive in up to three fields at once; see
/// [`InvocationEvent::query`] for which one is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    #[serde(default, alias = "httpMethod")]
    pub method: Option<String>,
    #[serde(default, alias = "rawPath")]
    pub path: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub query_string: Option<QueryInput>,
    #[serde(default)]
    pub raw_query_string: Option<String>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Query data as delivered by the host: raw text or an already parsed map
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QueryInput {
    Raw(String),
    Params(BTreeMap<String, String>),
}

impl InvocationEvent {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: Some(method.to_string()),
            path: Some(path.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryInput) -> Self {
        self.query_string = Some(query);
        self
    }

    /// Query data of the event.
    ///
    /// Precedence: `queryString`, then a non-empty `rawQueryString`, then
    /// `queryStringParameters`. Raw text wins over the parsed map because
    /// queries are passed on undecoded.
    pub fn query(&self) -> Option<QueryInput> {
        if let Some(query) = &self.query_string {
            return Some(query.clone());
        }
        match &self.raw_query_string {
            Some(raw) if !raw.is_empty() => Some(QueryInput::Raw(raw.clone())),
            _ => self
                .query_string_parameters
                .clone()
                .map(QueryInput::Params),
        }
    }

    /// Case-insensitive header lookup on the raw event headers
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Reply returned to the host for one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationReply {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}
