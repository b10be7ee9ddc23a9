// src/config.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory used for reports when running inside the container image.
const CONTAINER_OUTPUT_DIR: &str = "/output";
const DEFAULT_OUTPUT_DIR: &str = "reports";

/// Runtime configuration, built once at start-up and passed down by reference.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Upper bound on the number of subdomains kept in a result.
    pub max_subdomains_display: usize,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub dns_timeout: Duration,
    pub tls_timeout: Duration,
    pub ct_timeout: Duration,
    /// Body bytes kept for technology detection.
    pub max_body_bytes: usize,
    pub max_cname_depth: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_subdomains_display: 50,
            user_agent: format!("VanguardRecon/{}", env!("CARGO_PKG_VERSION")),
            http_timeout: Duration::from_secs(10),
            dns_timeout: Duration::from_secs(5),
            tls_timeout: Duration::from_secs(10),
            ct_timeout: Duration::from_secs(30),
            max_body_bytes: 1024 * 1024,
            max_cname_depth: 8,
        }
    }
}

impl ScannerConfig {
    /// Applies one timeout to every network collaborator. Certificate
    /// transparency keeps at least its default, crt.sh is slow.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self.dns_timeout = timeout;
        self.tls_timeout = timeout;
        self.ct_timeout = self.ct_timeout.max(timeout);
        self
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let directory = if Path::new(CONTAINER_OUTPUT_DIR).is_dir() {
            PathBuf::from(CONTAINER_OUTPUT_DIR)
        } else {
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        };
        Self { directory }
    }
}
