// httpd errors
#![forbid(unsafe_code)]
#![forbid(missing_docs)]
use thiserror::Error;

/// Errors raised while setting up or running the HTTP server.
#[derive(Debug, Error)]
pub enum HttpdError {
    /// The listener could not be bound, carries the address and the reason.
    #[error("failed to bind to {0}")]
    BindAddress(String),

    /// A scrape failed, either while refreshing/encoding or because the
    /// blocking task running it went away.
    #[error("error collecting metrics: {0}")]
    CollectorError(String),

    /// The server stopped with an I/O error while serving.
    #[error("httpd I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The index page could not be rendered.
    #[error("failed to render index page")]
    RenderTemplate(#[from] askama::Error),
}
