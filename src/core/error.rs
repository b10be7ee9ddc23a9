// src/core/error.rs

use thiserror::Error;

use crate::core::models::Phase;

/// Fatal errors: the only errors that leave the orchestrator.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("target is empty")]
    EmptyTarget,

    #[error("could not extract a hostname from '{0}'")]
    InvalidTarget(String),

    #[error("'{host}' is not a valid hostname: {reason}")]
    InvalidHostname { host: String, reason: &'static str },

    #[error("{phase} phase failed")]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: CollectorError,
    },
}

/// Phase-local errors raised by the I/O collaborators. The orchestrator absorbs
/// these into warnings; they never reach the caller.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DNS error: {0}")]
    Dns(#[from] hickory_resolver::error::ResolveError),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("certificate parse error: {0}")]
    Certificate(String),

    #[error("certificate transparency query failed: {0}")]
    CertificateTransparency(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Other(String),
}
