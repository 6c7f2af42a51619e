//! Document API
//!
//! Handler bodies for the text editor endpoints and the error taxonomy they
//! report through. Handlers return `Result<CanonicalResponse, ApiError>`;
//! the router selects them and the gateway turns errors into replies.

mod error;
pub mod handlers;
mod types;

pub use error::ApiError;
