//! Event-driven transports
//!
//! [`run_lambda`] serves events handed out by the function runtime API, one
//! invocation at a time, through `lambda_runtime`. [`run_lines`] is a local
//! harness that reads one JSON event per stdin line and writes one JSON reply
//! per line. In both, the process plays the role of a warm instance: every
//! event it receives is served by the same [`AppState`] and therefore the
//! same document store.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::api::ApiError;
use crate::config::AppState;
use crate::gateway::{encode, InvocationEvent, InvocationReply};
use crate::logger;

/// Serve runtime API invocations until the runtime shuts the process down
pub async fn run_lambda(state: Arc<AppState>) -> Result<(), Error> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<InvocationEvent>| {
        let state = Arc::clone(&state);
        async move { Ok::<_, Error>(handle_event(&state, event)) }
    }))
    .await
}

/// One runtime invocation; the gateway always produces a reply
fn handle_event(state: &AppState, event: LambdaEvent<InvocationEvent>) -> InvocationReply {
    state.invoke(event.payload, None)
}

/// Serve events from `input` until EOF; returns the number of replies written.
///
/// Lines are split on raw bytes, so a line that is not valid UTF-8 or not
/// valid JSON gets a 400 reply and the following lines are still served.
pub fn run_lines(state: &AppState, input: impl BufRead, mut output: impl Write) -> io::Result<usize> {
    let mut served = 0;

    for line in input.split(b'\n') {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let reply = match serde_json::from_slice::<InvocationEvent>(&line) {
            Ok(event) => state.invoke(event, None),
            Err(e) => {
                logger::log_warning(&format!("Malformed invocation event: {e}"));
                malformed_event_reply(&e)
            }
        };

        serde_json::to_writer(&mut output, &reply)?;
        writeln!(output)?;
        output.flush()?;
        served += 1;
    }

    Ok(served)
}

fn malformed_event_reply(err: &serde_json::Error) -> InvocationReply {
    encode(ApiError::BadRequest(format!("Invalid invocation event: {err}")).into_response())
}
