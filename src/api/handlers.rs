// Document handlers module
// Save, download and load endpoints plus the index message

use hyper::StatusCode;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{LoadRequest, LoadResponse, MessageResponse, SaveRequest, SaveResponse};
use crate::config::DeploymentMode;
use crate::gateway::{CanonicalRequest, CanonicalResponse};
use crate::http::{build_attachment_response, build_json_response};
use crate::store::{DocumentStore, TXT_SUFFIX};

pub const INDEX_MESSAGE: &str = "Text Editor API is running";

pub const UPLOAD_UNSUPPORTED_MESSAGE: &str =
    "File upload not supported in serverless mode. Please copy and paste your content instead.";

pub const MULTIPART_UNSUPPORTED_MESSAGE: &str =
    "Multipart upload is not supported. Send JSON with \"filename\" and \"content\" instead.";

/// `GET /`
pub fn index() -> CanonicalResponse {
    build_json_response(
        StatusCode::OK,
        &MessageResponse {
            message: INDEX_MESSAGE,
        },
    )
}

/// `POST /api/save`
pub fn save(
    request: &CanonicalRequest,
    store: &DocumentStore,
) -> Result<CanonicalResponse, ApiError> {
    let body: SaveRequest = parse_json_body(request)?;
    if body
        .filename
        .as_deref()
        .is_some_and(|name| name.chars().any(char::is_control))
    {
        return Err(ApiError::BadRequest(
            "Filename must not contain control characters".to_string(),
        ));
    }
    let record = store.save(body.filename.as_deref(), body.content.unwrap_or_default());

    Ok(build_json_response(
        StatusCode::OK,
        &SaveResponse {
            success: true,
            download_url: record.download_url(),
            filename: record.filename,
            file_id: record.id,
        },
    ))
}

/// `GET /api/download/<id>`; `id_segment` is everything after the route prefix
pub fn download(id_segment: &str, store: &DocumentStore) -> Result<CanonicalResponse, ApiError> {
    let id: u64 = id_segment
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid file ID".to_string()))?;
    let record = store.get(id)?;
    Ok(build_attachment_response(&record.filename, record.content))
}

/// `POST /api/load`
pub fn load(
    request: &CanonicalRequest,
    mode: DeploymentMode,
) -> Result<CanonicalResponse, ApiError> {
    if mode == DeploymentMode::Serverless {
        return Err(ApiError::Unsupported(UPLOAD_UNSUPPORTED_MESSAGE.to_string()));
    }
    if request
        .content_type
        .to_ascii_lowercase()
        .starts_with("multipart/")
    {
        return Err(ApiError::Unsupported(
            MULTIPART_UNSUPPORTED_MESSAGE.to_string(),
        ));
    }

    let body: LoadRequest = parse_json_body(request)?;
    let filename = body
        .filename
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file selected".to_string()))?;
    if !filename.ends_with(TXT_SUFFIX) {
        return Err(ApiError::BadRequest(
            "Only .txt files are supported".to_string(),
        ));
    }
    let content = body
        .content
        .ok_or_else(|| ApiError::BadRequest("No file content provided".to_string()))?;

    Ok(build_json_response(
        StatusCode::OK,
        &LoadResponse {
            success: true,
            content,
            filename,
        },
    ))
}

/// Parse the request body as JSON; an empty body yields `T::default()`
fn parse_json_body<T: DeserializeOwned + Default>(
    request: &CanonicalRequest,
) -> Result<T, ApiError> {
    let text = request
        .body_text()
        .map_err(|_| ApiError::BadRequest("Request body must be UTF-8 text".to_string()))?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(text).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{decode, InvocationEvent};
    use serde_json::{json, Value};

    fn post(path: &str, body: &str) -> CanonicalRequest {
        decode(
            InvocationEvent::new("POST", path)
                .with_header("content-type", "application/json")
                .with_body(body),
        )
        .unwrap()
    }

    fn body_json(response: &CanonicalResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn test_index() {
        let response = index();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body_json(&response), json!({"message": INDEX_MESSAGE}));
    }

    #[test]
    fn test_save_with_filename() {
        let store = DocumentStore::new();
        let response = save(
            &post("/api/save", r#"{"filename":"notes","content":"x"}"#),
            &store,
        )
        .unwrap();
        assert_eq!(
            body_json(&response),
            json!({
                "success": true,
                "filename": "notes.txt",
                "file_id": 0,
                "download_url": "/api/download/0"
            })
        );
    }

    #[test]
    fn test_save_empty_body_defaults() {
        let store = DocumentStore::new();
        let response = save(&post("/api/save", ""), &store).unwrap();
        let body = body_json(&response);
        assert!(body["filename"].as_str().unwrap().starts_with("document_"));
        assert_eq!(store.get(0).unwrap().content, "");
    }

    #[test]
    fn test_save_rejects_malformed_json() {
        let store = DocumentStore::new();
        let err = save(&post("/api/save", "{not json"), &store).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m.starts_with("Invalid JSON")));
        let err = save(&post("/api/save", r#"{"content": 5}"#), &store).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_rejects_control_characters_in_filename() {
        let store = DocumentStore::new();
        for body in [
            r#"{"filename":"a\r\nX-Injected: 1","content":"hi"}"#,
            r#"{"filename":"tab\there","content":"hi"}"#,
        ] {
            let err = save(&post("/api/save", body), &store).unwrap_err();
            assert_eq!(
                err,
                ApiError::BadRequest("Filename must not contain control characters".to_string())
            );
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_rejects_non_utf8_body() {
        let store = DocumentStore::new();
        let mut event = InvocationEvent::new("POST", "/api/save").with_body("/w==");
        event.is_base64_encoded = true;
        let request = decode(event).unwrap();
        let err = save(&request, &store).unwrap_err();
        assert_eq!(
            err,
            ApiError::BadRequest("Request body must be UTF-8 text".to_string())
        );
    }

    #[test]
    fn test_download_errors() {
        let store = DocumentStore::new();
        store.save(Some("a"), "hello");
        for bad in ["", "abc", "-1", "1.5", "0/1", "99999999999999999999999"] {
            assert_eq!(
                download(bad, &store).unwrap_err(),
                ApiError::BadRequest("Invalid file ID".to_string()),
                "segment {bad:?}"
            );
        }
        assert_eq!(
            download("1", &store).unwrap_err(),
            ApiError::NotFound("File not found".to_string())
        );
    }

    #[test]
    fn test_download_found() {
        let store = DocumentStore::new();
        store.save(Some("a"), "hello");
        let response = download("0", &store).unwrap();
        assert_eq!(&response.body[..], b"hello");
        assert_eq!(
            response.header("Content-Disposition"),
            Some("attachment; filename=\"a.txt\"")
        );
    }

    #[test]
    fn test_load_serverless_is_unsupported() {
        let request = post("/api/load", r#"{"filename":"a.txt","content":"x"}"#);
        assert_eq!(
            load(&request, DeploymentMode::Serverless).unwrap_err(),
            ApiError::Unsupported(UPLOAD_UNSUPPORTED_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_load_standalone() {
        let request = post("/api/load", r#"{"filename":"a.txt","content":"x"}"#);
        let response = load(&request, DeploymentMode::Standalone).unwrap();
        assert_eq!(
            body_json(&response),
            json!({"success": true, "content": "x", "filename": "a.txt"})
        );
    }

    #[test]
    fn test_load_standalone_validation() {
        let cases = [
            (r#"{"content":"x"}"#, "No file selected"),
            (r#"{"filename":"a.md","content":"x"}"#, "Only .txt files are supported"),
            (r#"{"filename":"a.txt"}"#, "No file content provided"),
        ];
        for (body, message) in cases {
            let err = load(&post("/api/load", body), DeploymentMode::Standalone).unwrap_err();
            assert_eq!(err, ApiError::BadRequest(message.to_string()));
        }
    }

    #[test]
    fn test_load_standalone_multipart() {
        let request = decode(
            InvocationEvent::new("POST", "/api/load")
                .with_header("Content-Type", "multipart/form-data; boundary=x")
                .with_body("--x--"),
        )
        .unwrap();
        assert!(matches!(
            load(&request, DeploymentMode::Standalone),
            Err(ApiError::Unsupported(_))
        ));
    }
}
