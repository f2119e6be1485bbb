//
// rctl_exporter
//
// This module deals with httpd related tasks.
//
#![forbid(unsafe_code)]
use axum::Router;
use axum::body::Bytes;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{
    debug,
    info,
};

mod collector;
pub use collector::Collector;

mod errors;
pub use errors::HttpdError;

mod handlers;
use handlers::{
    index,
    metrics,
};

mod templates;
use templates::render_index_page;

// Shared with the route handlers.
#[derive(Clone)]
pub(self) struct AppState {
    exporter:   Arc<dyn Collector>,
    index_page: Bytes,
}

// Used for the httpd builder
#[derive(Debug)]
pub struct Server {
    bind_address:   String,
    telemetry_path: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind_address:   "127.0.0.1:9166".into(),
            telemetry_path: "/metrics".into(),
        }
    }
}

// Implements a builder pattern for configuring and running the http server.
impl Server {
    // Returns a new server instance.
    pub fn new() -> Self {
        Default::default()
    }

    // Sets the bind_address of the server.
    pub fn bind_address(mut self, bind_address: String) -> Self {
        debug!("Setting server bind_address to: {bind_address}");

        self.bind_address = bind_address;
        self
    }

    // Sets the telemetry path for the metrics.
    pub fn telemetry_path(mut self, telemetry_path: String) -> Self {
        debug!("Setting server telemetry_path to: {telemetry_path}");

        self.telemetry_path = telemetry_path;
        self
    }

    // Builds the router serving the index page and the metrics.
    fn router<C>(&self, exporter: C) -> Result<Router, HttpdError>
    where
        C: Collector + 'static,
    {
        let state = AppState {
            exporter:   Arc::new(exporter),
            index_page: render_index_page(&self.telemetry_path)?,
        };

        debug!("Registering HTTP app routes");
        let router = Router::new()
            .route("/", get(index))
            .route(&self.telemetry_path, get(metrics))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Ok(router)
    }

    // Run the HTTP server until it receives ctrl-c.
    pub async fn run<C>(self, exporter: C) -> Result<(), HttpdError>
    where
        C: Collector + 'static,
    {
        let router = self.router(exporter)?;

        debug!("Attempting to bind to: {}", self.bind_address);
        let listener = TcpListener::bind(&self.bind_address)
            .await
            .map_err(|e| {
                HttpdError::BindAddress(format!("{}: {e}", self.bind_address))
            })?;

        info!("Starting HTTP server on {}", self.bind_address);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Unable to listen for shutdown signal: {e}");

        // Without a signal handler, serve until the process is killed.
        std::future::pending::<()>().await;
    }

    info!("Shutting down HTTP server");
}
