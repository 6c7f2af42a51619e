// Connection handling module
// Serves one TCP connection and bridges hyper requests into invocation events

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::AppState;
use crate::gateway::{encode, InvocationEvent, InvocationReply, QueryInput};
use crate::http::build_error_response;
use crate::logger;

/// Accept a connection, enforcing the connection limit, and serve it in a task
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve a single connection in a spawned task, decrementing the counter when done
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = std::time::Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&service_state);
                async move { handle_request(req, &state, peer_addr).await }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Run one HTTP request through the gateway
pub async fn handle_request<B>(
    req: Request<B>,
    state: &AppState,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let max_body_size = usize::try_from(state.config.gateway.max_body_size).unwrap_or(usize::MAX);

    if let Some(resp) = check_content_length(&req, max_body_size) {
        return Ok(resp);
    }

    let event = match into_event(req, max_body_size).await {
        Ok(event) => event,
        Err(resp) => return Ok(resp),
    };

    Ok(into_response(state.invoke(event, Some(peer_addr))))
}

/// Reject early when the declared `Content-Length` exceeds the limit
fn check_content_length<B>(req: &Request<B>, max_body_size: usize) -> Option<Response<Full<Bytes>>> {
    let declared = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<usize>()
        .ok()?;
    (declared > max_body_size).then(|| payload_too_large(declared, max_body_size))
}

/// Convert a hyper request into an invocation event.
///
/// Repeated headers are joined with `", "`. A body that is not valid UTF-8
/// is base64-encoded and flagged, so the gateway receives it unchanged.
async fn into_event<B>(req: Request<B>, max_body_size: usize) -> Result<InvocationEvent, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();

    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &parts.headers {
        let Ok(value) = value.to_str() else {
            logger::log_warning(&format!("Dropping non-ASCII header value for {name}"));
            continue;
        };
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let bytes = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(payload_too_large(max_body_size + 1, max_body_size));
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(into_response(encode(build_error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ))));
        }
    };

    let mut event = InvocationEvent::new(parts.method.as_str(), parts.uri.path());
    for (name, value) in &headers {
        event = event.with_header(name, value);
    }
    if let Some(query) = parts.uri.query() {
        event = event.with_query(QueryInput::Raw(query.to_string()));
    }
    if !bytes.is_empty() {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => event = event.with_body(text),
            Err(_) => {
                event = event.with_body(STANDARD.encode(&bytes));
                event.is_base64_encoded = true;
            }
        }
    }
    Ok(event)
}

fn payload_too_large(size: usize, max_body_size: usize) -> Response<Full<Bytes>> {
    logger::log_error(&format!(
        "Request body too large: {size} bytes (max: {max_body_size})"
    ));
    into_response(encode(build_error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        "Payload too large",
    )))
}

/// Convert an invocation reply into a hyper response.
///
/// A reply hyper cannot represent (bad status or header) is replaced by the
/// standard 500 JSON error, CORS header included.
fn into_response(reply: InvocationReply) -> Response<Full<Bytes>> {
    build_response(reply).unwrap_or_else(|e| {
        logger::log_error(&format!("Failed to build response: {e}"));
        internal_error_response()
    })
}

fn build_response(reply: InvocationReply) -> Result<Response<Full<Bytes>>, hyper::http::Error> {
    let mut builder = Response::builder().status(reply.status_code);
    for (name, value) in &reply.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Full::new(Bytes::from(reply.body)))
}

fn internal_error_response() -> Response<Full<Bytes>> {
    let reply = encode(build_error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ));

    let mut response = Response::new(Full::new(Bytes::from(reply.body)));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    for (name, value) in &reply.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}
