//! HTTP response layer
//!
//! Builders for the canonical responses the handlers return, plus the CORS
//! header set. Kept free of routing and store concerns.

pub mod cors;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_attachment_response, build_error_response, build_json_response,
    build_preflight_response,
};
