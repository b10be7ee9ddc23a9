// src/output/mod.rs

mod text;

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::core::models::ScanResult;

pub use text::render;

/// Which report files to write after a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportFormats {
    pub json: bool,
    pub text: bool,
}

impl ReportFormats {
    pub const BOTH: Self = Self { json: true, text: true };

    pub fn any(self) -> bool {
        self.json || self.text
    }
}

/// Prints the rendered report to stdout.
pub fn print_summary(result: &ScanResult) {
    println!("{}", render(result));
}

/// JSON and text report paths for `domain` inside `directory`.
pub fn report_paths(domain: &str, directory: &Path) -> (PathBuf, PathBuf) {
    let stem = domain.replace('.', "_");
    (
        directory.join(format!("{}_rankle.json", stem)),
        directory.join(format!("{}_rankle_report.txt", stem)),
    )
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

pub fn save_json(result: &ScanResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(result).wrap_err("Failed to serialize scan result")?;
    fs::write(path, json).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "JSON report saved.");
    Ok(())
}

pub fn save_text(result: &ScanResult, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, render(result)).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Text report saved.");
    Ok(())
}

/// Writes the requested reports and returns the paths written.
pub fn save_reports(result: &ScanResult, directory: &Path, formats: ReportFormats) -> Result<Vec<PathBuf>> {
    let (json_path, text_path) = report_paths(&result.domain, directory);
    let mut written = Vec::new();
    if formats.json {
        save_json(result, &json_path)?;
        written.push(json_path);
    }
    if formats.text {
        save_text(result, &text_path)?;
        written.push(text_path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vanguard-recon-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn report_paths_use_underscored_domain() {
        let (json, text) = report_paths("www.example.com", Path::new("reports"));
        assert_eq!(json, Path::new("reports/www_example_com_rankle.json"));
        assert_eq!(text, Path::new("reports/www_example_com_rankle_report.txt"));
    }

    #[test]
    fn saves_both_reports_into_a_new_directory() {
        let dir = scratch_dir("both");
        let mut result = ScanResult::new("example.com");
        result.subdomains.push("www.example.com".to_string());

        let written = save_reports(&result, &dir, ReportFormats::BOTH).unwrap();
        assert_eq!(written.len(), 2);

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["subdomains"][0], "www.example.com");
        assert!(json["security_headers"].as_object().unwrap().is_empty());

        let text = fs::read_to_string(&written[1]).unwrap();
        assert!(text.contains("www.example.com"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn nothing_written_when_no_format_selected() {
        let dir = scratch_dir("none");
        let written = save_reports(&ScanResult::new("example.com"), &dir, ReportFormats::default()).unwrap();
        assert!(written.is_empty());
        assert!(!dir.exists());
    }
}
