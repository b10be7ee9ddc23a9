// src/cli.rs

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::Config;
use crate::output::ReportFormats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputKind {
    Json,
    Text,
    Both,
}

#[derive(Debug, Parser)]
#[command(name = "vanguard-recon")]
#[command(version)]
#[command(about = "Passive reconnaissance and technology fingerprinting", long_about = None)]
pub struct Cli {
    /// Domains or URLs to scan. Without any, the interactive UI starts.
    pub domains: Vec<String>,

    /// Save a JSON report
    #[arg(short, long)]
    pub json: bool,

    /// Save a text report
    #[arg(short, long)]
    pub text: bool,

    /// Report format to save
    #[arg(short, long, value_enum)]
    pub output: Option<OutputKind>,

    /// Maximum number of subdomains kept in a report
    #[arg(long)]
    pub max_subdomains: Option<usize>,

    /// Network timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Directory for saved reports
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

impl Cli {
    /// Builds the runtime configuration from defaults plus command-line overrides.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        if let Some(secs) = self.timeout {
            config.scanner = config.scanner.with_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_subdomains {
            config.scanner.max_subdomains_display = max;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        config
    }

    /// Which report files to save after each headless scan.
    pub fn report_formats(&self) -> ReportFormats {
        let kind = self.output;
        ReportFormats {
            json: self.json || matches!(kind, Some(OutputKind::Json | OutputKind::Both)),
            text: self.text || matches!(kind, Some(OutputKind::Text | OutputKind::Both)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vanguard-recon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_arguments_means_interactive() {
        let cli = parse(&[]);
        assert!(cli.domains.is_empty());
        assert!(!cli.report_formats().any());
    }

    #[test]
    fn flags_select_report_formats() {
        assert_eq!(parse(&["example.com", "-j"]).report_formats(), ReportFormats { json: true, text: false });
        assert_eq!(parse(&["example.com", "-o", "text"]).report_formats(), ReportFormats { json: false, text: true });
        assert_eq!(parse(&["example.com", "--output", "both"]).report_formats(), ReportFormats::BOTH);
    }

    #[test]
    fn overrides_reach_the_config() {
        let cli = parse(&["a.com", "b.com", "--max-subdomains", "5", "--timeout", "3", "--output-dir", "/tmp/out"]);
        let config = cli.to_config();
        assert_eq!(cli.domains, vec!["a.com", "b.com"]);
        assert_eq!(config.scanner.max_subdomains_display, 5);
        assert_eq!(config.scanner.http_timeout, Duration::from_secs(3));
        assert_eq!(config.output.directory, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = ["vanguard-recon", "example.com", "--timeout", "0"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
