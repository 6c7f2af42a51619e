//! Gateway adapter
//!
//! Bridges the per-invocation event contract and the router:
//!
//! ```text
//! InvocationEvent --decode--> CanonicalRequest --dispatch--> CanonicalResponse --encode--> InvocationReply
//! ```
//!
//! The adapter holds no state of its own. It is also the single place that
//! guarantees a well-formed reply: dispatch errors and panics are turned into
//! a 500 JSON reply here instead of crossing the invocation boundary.

pub mod event;
pub mod request;
pub mod response;

pub use event::{InvocationEvent, InvocationReply, QueryInput};
pub use request::{decode, CanonicalRequest, Query};
pub use response::{encode, CanonicalResponse};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::api::ApiError;
use crate::logger;

/// Route logic invoked once per decoded request
pub trait Dispatch {
    fn dispatch(&self, request: &CanonicalRequest) -> Result<CanonicalResponse, ApiError>;
}

/// Event-to-request adapter wrapping a dispatcher
#[derive(Debug)]
pub struct Gateway<D> {
    dispatcher: D,
}

impl<D: Dispatch> Gateway<D> {
    pub const fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    pub const fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Run one full `decode -> dispatch -> encode` cycle. Never fails.
    pub fn handle(&self, event: InvocationEvent) -> InvocationReply {
        let response = match decode(event) {
            Ok(request) => self.dispatch(&request),
            Err(e) => {
                logger::log_warning(&format!("Rejected invocation event: {e}"));
                ApiError::BadRequest(e.to_string()).into_response()
            }
        };
        encode(response)
    }

    /// Dispatch with the last-resort safety net applied
    pub fn dispatch(&self, request: &CanonicalRequest) -> CanonicalResponse {
        match panic::catch_unwind(AssertUnwindSafe(|| self.dispatcher.dispatch(request))) {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                if let ApiError::Internal(message) = &err {
                    logger::log_error(&format!("{} failed: {message}", request.summary()));
                }
                err.into_response()
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                logger::log_error(&format!("{} panicked: {message}", request.summary()));
                ApiError::Internal(message).into_response()
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Internal server error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;

    struct Echo;

    impl Dispatch for Echo {
        fn dispatch(&self, request: &CanonicalRequest) -> Result<CanonicalResponse, ApiError> {
            Ok(CanonicalResponse::new(StatusCode::OK)
                .with_header("X-Method", request.method.as_str())
                .with_body(request.body.clone()))
        }
    }

    struct Failing;

    impl Dispatch for Failing {
        fn dispatch(&self, _request: &CanonicalRequest) -> Result<CanonicalResponse, ApiError> {
            Err(ApiError::Internal("database on fire".to_string()))
        }
    }

    struct Panicking;

    impl Dispatch for Panicking {
        fn dispatch(&self, _request: &CanonicalRequest) -> Result<CanonicalResponse, ApiError> {
            panic!("handler exploded");
        }
    }

    fn error_field(reply: &InvocationReply) -> String {
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_handle_round_trip() {
        let gateway = Gateway::new(Echo);
        let reply = gateway.handle(InvocationEvent::new("PUT", "/x").with_body("payload"));
        assert_eq!(reply.status_code, 200);
        assert_eq!(reply.body, "payload");
        assert_eq!(reply.headers.get("X-Method").unwrap(), "PUT");
    }

    #[test]
    fn test_dispatch_error_becomes_500() {
        let gateway = Gateway::new(Failing);
        let reply = gateway.handle(InvocationEvent::new("GET", "/"));
        assert_eq!(reply.status_code, 500);
        assert_eq!(reply.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(error_field(&reply), "database on fire");
    }

    #[test]
    fn test_panic_is_contained() {
        let gateway = Gateway::new(Panicking);
        let reply = gateway.handle(InvocationEvent::new("POST", "/api/save"));
        assert_eq!(reply.status_code, 500);
        assert_eq!(reply.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(error_field(&reply), "handler exploded");
    }

    #[test]
    fn test_bad_event_becomes_400() {
        let gateway = Gateway::new(Echo);
        let mut event = InvocationEvent::new("POST", "/").with_body("%%%");
        event.is_base64_encoded = true;
        let reply = gateway.handle(event);
        assert_eq!(reply.status_code, 400);
        assert!(error_field(&reply).starts_with("Invalid base64 body"));
    }

    #[test]
    fn test_panic_message_fallback() {
        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "Internal server error");
    }
}
