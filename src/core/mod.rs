// src/core/mod.rs

/// Data structures shared by the scanner, the reports and the UI.
pub mod models;

/// Fatal and phase-local error types.
pub mod error;

/// Pure helpers that pull candidate signals out of raw responses.
pub mod signals;

/// Rule tables that turn signals into technology, CDN, WAF and cloud labels.
pub mod fingerprint;

/// Network collaborators (DNS, HTTP, TLS, geolocation) behind async traits.
pub mod scanner;

/// Progress notifications emitted while a scan runs.
pub mod observer;

/// The phase pipeline for one target.
pub mod orchestrator;

/// Explanations and remediation advice for audited security headers.
pub mod knowledge_base;
