// API types module
// Request and response payloads of the document endpoints

use serde::{Deserialize, Serialize};

/// `POST /api/save` body
#[derive(Debug, Default, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub filename: String,
    pub file_id: u64,
    pub download_url: String,
}

/// `POST /api/load` body in standalone mode
#[derive(Debug, Default, Deserialize)]
pub struct LoadRequest {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub success: bool,
    pub content: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body of a `success: false` reply
#[derive(Debug, Serialize)]
pub struct UnsupportedResponse {
    pub success: bool,
    pub message: String,
}
