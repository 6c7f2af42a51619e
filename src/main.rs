use std::sync::Arc;
use tokio::sync::Notify;

mod api;
mod config;
mod gateway;
mod http;
mod invoke;
mod logger;
mod routing;
mod server;
mod store;

use crate::config::{AppState, Config, Transport, DEFAULT_CONFIG_PATH};

/// Usage: `text_editor_gateway [invoke|stdin|serve] [config-path]`
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let transport = match args.next().as_deref() {
        None | Some("invoke") => Transport::Invoke,
        Some("stdin") => Transport::Stdin,
        Some("serve") => Transport::Serve,
        Some(other) => {
            return Err(format!(
                "Unknown transport '{other}', expected 'invoke', 'stdin' or 'serve'"
            )
            .into())
        }
    };
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg, transport)?;

    let state = AppState::new(&cfg, transport);
    logger::log_startup(&cfg, transport, state.mode());

    match transport {
        Transport::Invoke => run_invoke(&cfg, state),
        Transport::Stdin => run_stdin(&state),
        Transport::Serve => run_serve(cfg, state),
    }
}

fn build_runtime(cfg: &Config) -> std::io::Result<tokio::runtime::Runtime> {
    // 创建 Tokio 运行时，根据 workers 配置设置线程数
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    runtime_builder.build()
}

fn run_invoke(cfg: &Config, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(cfg)?;
    runtime
        .block_on(invoke::run_lambda(Arc::new(state)))
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;
    logger::log_shutdown("Runtime API loop ended");
    Ok(())
}

fn run_stdin(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let served = invoke::run_lines(state, stdin.lock(), stdout.lock())?;
    logger::log_shutdown(&format!(
        "Input closed after {served} events ({} documents stored)",
        state.store.len()
    ));
    Ok(())
}

fn run_serve(cfg: Config, state: AppState) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = build_runtime(&cfg)?;

    runtime.block_on(async move {
        let addr = cfg.get_socket_addr()?;
        let listener = server::bind_listener(addr)?;
        logger::log_listening(&addr, &cfg);

        let shutdown = Arc::new(Notify::new());
        server::spawn_shutdown_listener(Arc::clone(&shutdown));

        let open = server::run_server(listener, Arc::new(state), shutdown).await;
        logger::log_shutdown(&format!("Stopped accepting; {open} connections still open"));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
