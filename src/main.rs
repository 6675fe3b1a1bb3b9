//! Hegemon StatusWatch — status page monitor daemon.
//!
//! Runs until interrupted (Ctrl-C, or SIGTERM on unix). Configuration comes
//! from `~/.openclaw/statuswatch.yaml` and `STATUSWATCH_*` variables; there
//! are no command-line flags.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use statuswatch::{ConsoleSink, EventSink, LogSink, StatusWatcher, WatcherConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statuswatch=info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("🛰️  Hegemon StatusWatch v{}", env!("CARGO_PKG_VERSION"));

    let config = WatcherConfig::load().context("Failed to load watcher configuration")?;

    let sinks: Vec<Box<dyn EventSink>> = vec![Box::new(ConsoleSink), Box::new(LogSink)];
    let mut watcher = StatusWatcher::new(&config, sinks)?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    println!("Monitoring {}...\n", config.status_url);
    watcher.run(shutdown).await;
    println!("\nStopped.");

    Ok(())
}

/// Cancel `token` on the first Ctrl-C or SIGTERM.
async fn watch_signals(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
    }

    info!("Interrupt received");
    token.cancel();
}
