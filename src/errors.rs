// errors: Top level errors for the exporter.
#![forbid(unsafe_code)]
use crate::httpd::HttpdError;
use crate::rctl::RctlError;
use thiserror::Error;

/// Errors that stop the exporter from starting or serving.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Returned when the metrics cannot be rendered as text.
    #[error("failed to encode metrics")]
    Encode(#[from] std::fmt::Error),

    /// Returned when the HTTP server fails.
    #[error(transparent)]
    Httpd(#[from] HttpdError),

    /// Returned when we're not running as root.
    #[error("rctl_exporter must be run as root")]
    NotRunningAsRoot,

    /// Returned by the accounting engine.
    #[error(transparent)]
    Rctl(#[from] RctlError),

    /// Returned when RACCT/RCTL cannot be used on this host.
    #[error("RACCT/RCTL: {0}")]
    RctlUnavailable(String),
}
