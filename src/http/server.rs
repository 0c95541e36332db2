//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the route table and page registry for the configured project
//! - Create the Axum Router with all handlers
//! - Wire up middleware (host check, timeout, request ID, tracing)
//! - Resolve navigations and render pages
//! - Serve the entry module, hot reload events and the bundler config

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use futures_util::stream::{self, Stream};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{BundlerConfig, DevConfig};
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::http::response::{render_page, ShellOptions, HOT_PATH};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::{self, NavigationOutcome};
use crate::pages::{PageRegistry, PageSource};
use crate::routing::{RouteError, RouteTable};
use crate::security::{allowed_hosts_middleware, HostPolicy, SharedHostPolicy};
use crate::watch::ReloadHub;

/// Path serving the bundler view of the configuration.
pub const CONFIG_PATH: &str = "/__devserver/config";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub pages: Arc<PageRegistry>,
    pub hosts: SharedHostPolicy,
    /// Present when hot reload is enabled.
    pub reload: Option<ReloadHub>,
    pub shell: Arc<ShellOptions>,
    pub bundler: Arc<BundlerConfig>,
    pub shutdown: Shutdown,
}

/// HTTP dev server.
pub struct HttpServer {
    router: Router,
    config: DevConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server for the project rooted at `root`. Page modules are
    /// read from `root/<source_dir>`.
    pub fn new(config: DevConfig, root: &Path) -> Result<Self, RouteError> {
        let source = PageSource::filesystem(root.join(&config.source_dir));
        Self::with_source(config, root, source)
    }

    /// Create a server reading page modules from `source`.
    pub fn with_source(config: DevConfig, root: &Path, source: PageSource) -> Result<Self, RouteError> {
        let mut pages = PageRegistry::new(source);
        let routes = RouteTable::from_defs(&config.routes, &mut pages)?;

        let state = AppState {
            routes: Arc::new(routes),
            pages: Arc::new(pages),
            hosts: HostPolicy::shared(&config.dev_server.allowed_hosts),
            reload: config.dev_server.hot.then(ReloadHub::default),
            shell: Arc::new(ShellOptions::new(&config.entry, root, config.dev_server.hot)),
            bundler: Arc::new(BundlerConfig::from(&config)),
            shutdown: Shutdown::new(),
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DevConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(&state.shell.entry_url, get(entry_handler))
            .route(CONFIG_PATH, get(config_handler));
        if state.reload.is_some() {
            router = router.route(HOT_PATH, get(hot_events));
        }

        router
            .fallback(navigate)
            .with_state(state.clone())
            .layer(middleware::from_fn_with_state(
                state.hosts.clone(),
                allowed_hosts_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// Run the server until the shutdown handle fires.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.routes.len(),
            hot = self.config.dev_server.hot,
            "Dev server starting"
        );

        let shutdown = self.state.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        tracing::info!("Dev server stopped");
        Ok(())
    }

    /// Router with all layers, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle that stops the server and its hot reload streams.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.state.shutdown.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DevConfig {
        &self.config
    }
}

/// Navigation handler: resolve the path and render or redirect.
async fn navigate(State(state): State<AppState>, req: Request) -> Response {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let request_id = request_id(&req);
    let (parts, _) = req.into_parts();
    let uri = parts.uri;
    let path = uri.path();

    let resolution = match state.routes.resolve(path) {
        Ok(resolution) => resolution,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Navigation failed");
            metrics::record_navigation(NavigationOutcome::NotFound, "none");
            return (StatusCode::NOT_FOUND, e.to_string()).into_response();
        }
    };
    let route_label = resolution.entry.path().to_string();

    if resolution.is_redirect() {
        let location = match uri.query() {
            Some(query) => format!("{}?{}", resolution.path, query),
            None => resolution.path.clone(),
        };
        tracing::debug!(request_id = %request_id, from = %path, to = %location, "Redirecting");
        metrics::record_navigation(NavigationOutcome::Redirect, &route_label);
        return (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    }

    match resolution.component.load().await {
        Ok(view) => {
            tracing::debug!(
                request_id = %request_id,
                path = %path,
                route = ?resolution.entry.name(),
                module = %view.module(),
                "Rendering page"
            );
            metrics::record_navigation(NavigationOutcome::Page, &route_label);
            Html(render_page(&state.shell, &resolution, &view)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Page load failed");
            metrics::record_navigation(NavigationOutcome::Error, &route_label);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve the entry module, read fresh on every request.
async fn entry_handler(State(state): State<AppState>) -> Response {
    match tokio::fs::read(&state.shell.entry_file).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(file = ?state.shell.entry_file, error = %e, "Entry module unavailable");
            (StatusCode::NOT_FOUND, "Entry module not found").into_response()
        }
    }
}

async fn config_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(state.bundler.to_json())
}

/// Server-sent event stream of reload events.
async fn hot_events(State(state): State<AppState>) -> Response {
    let Some(hub) = state.reload.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let stream = reload_stream(hub, &state.shutdown);
    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}

fn reload_stream(
    hub: &ReloadHub,
    shutdown: &Shutdown,
) -> impl Stream<Item = Result<Event, axum::Error>> + Send + 'static {
    let events = hub.subscribe();
    let stop = shutdown.clone();

    stream::unfold((events, stop), |(mut events, stop)| async move {
        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => {
                        let item = Event::default().event("reload").json_data(&event);
                        return Some((item, (events, stop)));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Hot reload client lagged");
                    }
                    Err(RecvError::Closed) => return None,
                },
                _ = stop.wait() => return None,
            }
        }
    })
}
