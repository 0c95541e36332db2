//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics when enabled
//! - Compile routes and build the dev server
//! - Start background tasks (source watcher, hot reloader, config watcher)
//! - Bind the listener and serve until shutdown
//!
//! `serve` takes an already bound listener so the whole wiring can run on
//! an ephemeral port.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Bind errors surface before any watcher starts
//! - A broken config reload never takes the server down

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use crate::config::{ConfigWatcher, DevConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::RouteError;
use crate::security::{HostPolicy, SharedHostPolicy};
use crate::watch::{HotReloader, SourceWatcher};

/// Error type for startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid routes: {0}")]
    Routes(#[from] RouteError),
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
    #[error("invalid watch ignore pattern: {0}")]
    IgnorePattern(#[from] regex::Error),
    #[error("failed to start watcher: {0}")]
    Watch(#[from] notify::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Run the dev server for the project rooted at `root` until a termination
/// signal arrives. With `config_path`, the allow-list follows edits to that file.
pub async fn start(config: DevConfig, root: &Path, config_path: Option<&Path>) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.dev_server.bind_address,
        entry = %config.entry,
        hot = config.dev_server.hot,
        watch = config.watch,
        poll_ms = config.watch_options.poll_ms,
        transpile_dependencies = config.transpile_dependencies,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.dev_server.bind_address).await?;
    let server = HttpServer::new(config, root)?;
    signals::spawn_signal_handler(server.shutdown_handle());

    serve(server, root, config_path, listener).await
}

/// Start the background tasks the server's config asks for (source watcher
/// and hot reloader, config file watcher), then serve on `listener` until
/// the server's shutdown handle fires.
pub async fn serve(
    server: HttpServer,
    root: &Path,
    config_path: Option<&Path>,
    listener: TcpListener,
) -> Result<(), StartupError> {
    let config = server.config().clone();
    let shutdown = server.shutdown_handle();

    // Watchers stop when dropped; keep them until the server returns.
    let _source_watcher = if config.watch {
        let source_root = root.join(&config.source_dir);
        let entry_file = server.state().shell.entry_file.clone();
        let mut roots = vec![source_root.clone()];
        if !entry_file.starts_with(&source_root) {
            roots.push(entry_file);
        }

        let (watcher, changes) = SourceWatcher::new(roots, &config.watch_options)?;
        let hub = server.state().reload.clone().unwrap_or_default();
        let reloader = HotReloader::new(server.state().pages.clone(), hub);
        tokio::spawn(reloader.run(changes, shutdown.subscribe()));
        Some(watcher.run()?)
    } else {
        None
    };

    let _config_watcher = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            tokio::spawn(apply_config_updates(
                server.state().hosts.clone(),
                updates,
                shutdown.subscribe(),
            ));
            match watcher.run() {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, live reload disabled");
                    None
                }
            }
        }
        None => None,
    };

    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    server.run(listener).await?;
    Ok(())
}

/// Apply reloaded configurations. Only the host allow-list takes effect
/// without a restart.
pub async fn apply_config_updates(
    hosts: SharedHostPolicy,
    mut updates: mpsc::UnboundedReceiver<DevConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                hosts.store(Arc::new(HostPolicy::new(&config.dev_server.allowed_hosts)));
                tracing::info!(
                    allowed_hosts = ?config.dev_server.allowed_hosts,
                    "Allowed hosts updated; other changes apply on restart"
                );
            }
            _ = shutdown.recv() => break,
        }
    }
}
