//! Canonical response builders
//!
//! Every builder attaches `Access-Control-Allow-Origin: *`, so handlers never
//! have to remember it.

use hyper::StatusCode;
use serde::Serialize;

use super::cors;
use crate::gateway::CanonicalResponse;
use crate::logger;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Build JSON response
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> CanonicalResponse {
    match serde_json::to_vec(body) {
        Ok(json) => base_response(status)
            .with_header("Content-Type", CONTENT_TYPE_JSON)
            .with_body(json),
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            base_response(StatusCode::INTERNAL_SERVER_ERROR)
                .with_header("Content-Type", CONTENT_TYPE_JSON)
                .with_body(r#"{"error":"Internal server error"}"#)
        }
    }
}

/// Build `{"error": message}` response
pub fn build_error_response(status: StatusCode, message: &str) -> CanonicalResponse {
    build_json_response(status, &serde_json::json!({ "error": message }))
}

/// Build plain-text download response
pub fn build_attachment_response(filename: &str, content: String) -> CanonicalResponse {
    let quoted: String = filename
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    base_response(StatusCode::OK)
        .with_header("Content-Type", CONTENT_TYPE_TEXT)
        .with_header(
            "Content-Disposition",
            format!("attachment; filename=\"{quoted}\""),
        )
        .with_body(content)
}

/// Build OPTIONS preflight response: 200, empty body, CORS headers only
pub fn build_preflight_response() -> CanonicalResponse {
    base_response(StatusCode::OK)
        .with_header(cors::ALLOW_HEADERS, cors::ALLOWED_HEADERS)
        .with_header(cors::ALLOW_METHODS, cors::ALLOWED_METHODS)
}

fn base_response(status: StatusCode) -> CanonicalResponse {
    CanonicalResponse::new(status).with_header(cors::ALLOW_ORIGIN, cors::ANY_ORIGIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response_headers() {
        let response = build_json_response(StatusCode::OK, &serde_json::json!({"ok": true}));
        assert_eq!(response.header("Content-Type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(response.header(cors::ALLOW_ORIGIN), Some("*"));
        assert_eq!(&response.body[..], br#"{"ok":true}"#);
    }

    #[test]
    fn test_error_response_body() {
        let response = build_error_response(StatusCode::NOT_FOUND, "File not found");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(&response.body[..], br#"{"error":"File not found"}"#);
    }

    #[test]
    fn test_attachment_response() {
        let response = build_attachment_response("my \"notes\".txt", "hello".to_string());
        assert_eq!(response.header("Content-Type"), Some(CONTENT_TYPE_TEXT));
        assert_eq!(
            response.header("Content-Disposition"),
            Some(r#"attachment; filename="my \"notes\".txt""#)
        );
        assert_eq!(&response.body[..], b"hello");
    }

    #[test]
    fn test_attachment_filename_control_characters_replaced() {
        let response = build_attachment_response("a\r\nX-Injected: 1.txt", String::new());
        assert_eq!(
            response.header("Content-Disposition"),
            Some(r#"attachment; filename="a__X-Injected: 1.txt""#)
        );
    }

    #[test]
    fn test_preflight_response() {
        let response = build_preflight_response();
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
        assert_eq!(response.header(cors::ALLOW_ORIGIN), Some("*"));
        assert_eq!(response.header(cors::ALLOW_METHODS), Some(cors::ALLOWED_METHODS));
        assert_eq!(response.header(cors::ALLOW_HEADERS), Some(cors::ALLOWED_HEADERS));
        assert_eq!(response.header("Content-Type"), None);
    }
}
