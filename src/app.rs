use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::llm_clients::RouterClient;
use crate::interfaces::http::{add_log, start_server, LogEntry};
use crate::interfaces::AppState;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_level);

    let host = config.server.host.clone();
    let port = config.server.port;
    info!(
        language = %config.language,
        provider = ?config.llm.provider,
        model = %config.llm.model,
        "configuration loaded"
    );

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    let state = Arc::new(AppState::new(config, Arc::new(RouterClient::new())));

    let server = start_server(state, logs.clone())?;
    add_log(
        &logs,
        "INFO",
        "System",
        &format!("HTTP server started on {}:{}", host, port),
    );
    info!(%host, port, "HTTP server started");

    server.await?;
    Ok(())
}
