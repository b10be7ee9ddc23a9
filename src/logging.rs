// src/logging.rs

use color_eyre::eyre::{Result, WrapErr};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::fs::{self, File};
use std::path::PathBuf;
use time::{UtcOffset, macros::format_description};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

lazy_static! {
    /// `VANGUARD_RECON`, the prefix of every environment variable the binary reads.
    pub static ref ENV_PREFIX: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref LOG_LEVEL_ENV: String = format!("{}_LOGLEVEL", *ENV_PREFIX);
    pub static ref DATA_DIR_ENV: String = format!("{}_DATA", *ENV_PREFIX);
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Where the log file lives: `$VANGUARD_RECON_DATA`, else the platform data dir, else `./.data`.
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV.as_str()) {
        return PathBuf::from(dir);
    }
    ProjectDirs::from("io", "vanguard", env!("CARGO_PKG_NAME"))
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

fn filter_directive() -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_LEVEL_ENV.as_str()))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")))
}

/// Sends tracing output to a file, never to the terminal, and returns the file's path.
pub fn initialize_logging() -> Result<PathBuf> {
    let directory = get_data_dir();
    fs::create_dir_all(&directory)
        .wrap_err_with(|| format!("Failed to create log directory {}", directory.display()))?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file =
        File::create(&log_path).wrap_err_with(|| format!("Failed to create log file {}", log_path.display()))?;

    // Reading the local offset fails once other threads exist.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"),
    );

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_timer(timer)
        .with_target(false)
        .with_ansi(false)
        .with_filter(EnvFilter::new(filter_directive()));

    tracing_subscriber::registry().with(file_layer).with(ErrorLayer::default()).init();

    Ok(log_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_derive_from_the_crate() {
        assert_eq!(ENV_PREFIX.as_str(), "VANGUARD_RECON");
        assert_eq!(LOG_LEVEL_ENV.as_str(), "VANGUARD_RECON_LOGLEVEL");
        assert_eq!(LOG_FILE.as_str(), "vanguard-recon.log");
    }
}
