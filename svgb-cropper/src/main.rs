//! svgb-cropper - SVG Bulk Processor
//!
//! Serves the icons of an input directory one at a time to a browser UI,
//! which trims their whitespace and sends them back. Cropped icons are saved
//! to the output directory under normalized names. The process exits once
//! every icon has been processed.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use svgb_common::events::{EventBus, SessionEvent};
use tokio::signal;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svgb_cropper::config::{Args, CropperConfig};
use svgb_cropper::session::CropSession;
use svgb_cropper::status::TerminalStatusSink;
use svgb_cropper::store::AssetStore;
use svgb_cropper::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the live status line
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svgb_cropper=info,svgb_common=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting svgb-cropper v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = CropperConfig::load(&args).context("Invalid configuration")?;

    info!("SVG Bulk Processor");
    info!(" * input directory: {}", config.dirs.input.display());
    info!(" * output directory: {}", config.dirs.output.display());
    info!(" * mode: {:?}", config.mode);

    let event_bus = EventBus::new(100);
    // Subscribe before the first step can complete the session
    let completion_rx = event_bus.subscribe();

    let mut session = CropSession::new(
        config.dirs.clone(),
        config.mode,
        config.rules.clone(),
        AssetStore::new(config.io_timeout),
        event_bus.clone(),
        Box::new(TerminalStatusSink::new()),
    );
    session
        .start()
        .await
        .context("Failed to scan input directory")?;

    let app = build_router(AppState::new(session, event_bus));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let url = format!("http://localhost:{}", config.port);
    info!("🚀 Goto {} to start converting (CTL+C to exit)", url);

    if config.open_browser {
        tokio::task::spawn_blocking(move || {
            if let Err(e) = open::that(&url) {
                warn!("Could not open browser: {}", e);
            }
        });
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(completion_rx))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves when the session completes or the process is asked to stop
async fn shutdown_signal(mut events: broadcast::Receiver<SessionEvent>) {
    let completed = async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::SessionCompleted { .. }) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Shutdown watcher lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => std::future::pending::<()>().await,
            }
        }
    };

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = completed => {
            info!("Generation complete!");
        },
        _ = ctrl_c => {
            info!("Script cancelled...");
        },
        _ = terminate => {
            info!("Script cancelled...");
        },
    }
}
