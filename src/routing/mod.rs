//! Request routing
//!
//! Static dispatch table for the document API. `OPTIONS` on any path is
//! answered with a CORS preflight before the table is consulted; a pair that
//! matches no row is a 404.

mod matcher;

use matcher::{match_route, PathMatch, Route};

use hyper::Method;
use std::sync::Arc;

use crate::api::{handlers, ApiError};
use crate::config::DeploymentMode;
use crate::gateway::{CanonicalRequest, CanonicalResponse, Dispatch};
use crate::http::build_preflight_response;
use crate::store::DocumentStore;

/// Handler selected by a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Index,
    Save,
    Load,
    Download,
}

static ROUTES: [Route; 4] = [
    Route {
        method: Method::GET,
        path: PathMatch::Exact("/"),
        endpoint: Endpoint::Index,
    },
    Route {
        method: Method::POST,
        path: PathMatch::Exact("/api/save"),
        endpoint: Endpoint::Save,
    },
    Route {
        method: Method::POST,
        path: PathMatch::Exact("/api/load"),
        endpoint: Endpoint::Load,
    },
    Route {
        method: Method::GET,
        path: PathMatch::Prefix("/api/download/"),
        endpoint: Endpoint::Download,
    },
];

/// Dispatcher owning a handle to the process's document store
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<DocumentStore>,
    mode: DeploymentMode,
}

impl Router {
    pub const fn new(store: Arc<DocumentStore>, mode: DeploymentMode) -> Self {
        Self { store, mode }
    }

    pub const fn mode(&self) -> DeploymentMode {
        self.mode
    }
}

impl Dispatch for Router {
    fn dispatch(&self, request: &CanonicalRequest) -> Result<CanonicalResponse, ApiError> {
        if request.method == Method::OPTIONS {
            return Ok(build_preflight_response());
        }

        let Some((route, rest)) = match_route(&request.method, &request.path, &ROUTES) else {
            return Err(ApiError::NotFound("Not found".to_string()));
        };

        match route.endpoint {
            Endpoint::Index => Ok(handlers::index()),
            Endpoint::Save => handlers::save(request, &self.store),
            Endpoint::Load => handlers::load(request, self.mode),
            Endpoint::Download => handlers::download(rest, &self.store),
        }
    }
}
