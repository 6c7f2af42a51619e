// Application state module
// Owns the document store and gateway for one process instance

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::types::{Config, DeploymentMode, Transport};
use crate::gateway::{Gateway, InvocationEvent, InvocationReply};
use crate::logger::{self, AccessLogEntry};
use crate::routing::Router;
use crate::store::DocumentStore;

/// Per-process application state.
///
/// Built once at startup and shared by every invocation the process serves,
/// so all of them see the same document store.
pub struct AppState {
    pub config: Config,
    pub transport: Transport,
    pub store: Arc<DocumentStore>,
    gateway: Gateway<Router>,
}

impl AppState {
    pub fn new(config: &Config, transport: Transport) -> Self {
        let store = Arc::new(DocumentStore::new());
        let mode = config.deployment_mode(transport);

        Self {
            config: config.clone(),
            transport,
            gateway: Gateway::new(Router::new(Arc::clone(&store), mode)),
            store,
        }
    }

    pub const fn mode(&self) -> DeploymentMode {
        self.gateway.dispatcher().mode()
    }

    /// Handle one invocation event and write its access log line
    pub fn invoke(&self, event: InvocationEvent, remote_addr: Option<SocketAddr>) -> InvocationReply {
        let started = Instant::now();
        let access_log = self.config.logging.access_log;

        if let Some(headers) = &event.headers {
            logger::log_headers(headers.keys(), self.config.logging.show_headers);
        }

        let entry = access_log.then(|| AccessLogEntry::from_event(&event, self.transport, remote_addr));

        let reply = self.gateway.handle(event);

        if let Some(mut entry) = entry {
            entry.status = reply.status_code;
            entry.body_bytes = reply.body.len();
            entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            logger::log_access(&entry, &self.config.logging.access_log_format);
        }

        reply
    }
}
