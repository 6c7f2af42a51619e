//! Logger module
//!
//! Provides logging utilities for the gateway including:
//! - Startup and shutdown logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, DeploymentMode, Transport};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config, transport: Transport) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        transport == Transport::Stdin,
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_startup(config: &Config, transport: Transport, mode: DeploymentMode) {
    write_info("======================================");
    write_info("Text editor gateway started");
    write_info(&format!("Transport: {transport}"));
    write_info(&format!("Deployment mode: {mode:?}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_listening(addr: &SocketAddr, config: &Config) {
    write_info(&format!("[HTTP] Listening on: http://{addr}"));
    match config.server.workers {
        Some(workers) => write_info(&format!("[HTTP] Worker threads: {workers}")),
        None => write_info("[HTTP] Worker threads: CPU cores"),
    }
    write_info(&format!(
        "[HTTP] Max body size: {} bytes",
        config.gateway.max_body_size
    ));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_document_saved(id: u64, filename: &str, bytes: usize) {
    write_info(&format!("[Store] Saved document {id} as {filename} ({bytes} bytes)"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_headers<'a>(names: impl ExactSizeIterator<Item = &'a String>, show: bool) {
    if show {
        let count = names.len();
        let names: Vec<&str> = names.map(String::as_str).collect();
        write_info(&format!("[Headers] Count: {count} ({})", names.join(", ")));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_shutdown(reason: &str) {
    write_info(&format!("[Shutdown] {reason}"));
}
