use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use replywise::api::api_routes;
use replywise::config::{GenerationConfig, ServerConfig};
use replywise::llm::create_adapter;
use replywise::pipeline::ReplyDrafter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env();

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(server_config.log_dir.as_deref());

    eprintln!("✉️  ReplyWise v{}", env!("CARGO_PKG_VERSION"));

    // ── Generative provider ─────────────────────────────────────────────
    let drafter = match GenerationConfig::from_env() {
        Ok(config) => {
            eprintln!("   Model: {}", config.model);
            eprintln!(
                "   Request timeout: {}s, JSON repair: {}",
                config.request_timeout.as_secs(),
                if config.json_repair { "on" } else { "off" }
            );
            let adapter = create_adapter(&config).context("Failed to create Gemini adapter")?;
            Some(Arc::new(ReplyDrafter::new(adapter)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "GEMINI_API_KEY missing, drafting endpoints disabled");
            eprintln!("   ⚠️  Drafting disabled: {e}");
            None
        }
    };

    // ── HTTP server ─────────────────────────────────────────────────────
    let app = api_routes(drafter);
    let addr = format!("0.0.0.0:{}", server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    eprintln!("   API: http://{addr}/api/generate, /api/rewrite");
    eprintln!("   Health: http://{addr}/health\n");
    tracing::info!(port = server_config.port, "ReplyWise API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("ReplyWise API stopped");
    Ok(())
}

/// Stderr logging always; a daily-rolling file too when a log dir is set.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "replywise.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
