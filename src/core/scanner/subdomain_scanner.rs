// src/core/scanner/subdomain_scanner.rs

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ScannerConfig;
use crate::core::error::CollectorError;

const CRT_SH_URL: &str = "https://crt.sh/";

/// One certificate entry from the crt.sh JSON API.
#[derive(Debug, Deserialize)]
struct CertificateEntry {
    name_value: String,
}

/// Certificate-transparency client for crt.sh.
pub struct CrtShClient {
    client: reqwest::Client,
}

impl CrtShClient {
    pub fn new(config: &ScannerConfig) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.ct_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Hostnames under `domain` seen in issued certificates, in discovery order.
    pub async fn enumerate(&self, domain: &str) -> Result<Vec<String>, CollectorError> {
        let query = format!("%.{}", domain);
        debug!(domain, "Querying crt.sh.");

        let response = self
            .client
            .get(CRT_SH_URL)
            .query(&[("q", query.as_str()), ("output", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(domain, %status, "crt.sh returned an error status.");
            return Err(CollectorError::CertificateTransparency(format!("crt.sh returned HTTP {}", status)));
        }

        let entries: Vec<CertificateEntry> = response
            .json()
            .await
            .map_err(|e| CollectorError::CertificateTransparency(format!("invalid crt.sh response: {}", e)))?;

        Ok(collect_subdomains(entries.into_iter().map(|e| e.name_value), domain))
    }
}

/// Flattens crt.sh `name_value` fields into unique subdomains of `domain`.
///
/// Names are lower-cased, wildcard prefixes dropped, the apex excluded and
/// first-seen order preserved.
fn collect_subdomains<I>(name_values: I, domain: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let domain = domain.to_ascii_lowercase();
    let suffix = format!(".{}", domain);
    let mut seen = HashSet::new();
    let mut subdomains = Vec::new();

    for value in name_values {
        for name in value.split('\n') {
            let name = name.trim().to_ascii_lowercase();
            let name = name.strip_prefix("*.").unwrap_or(&name).to_string();
            if name.is_empty() || name.contains('*') || name == domain || !name.ends_with(&suffix) {
                continue;
            }
            if seen.insert(name.clone()) {
                subdomains.push(name);
            }
        }
    }
    subdomains
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_crt_sh_entries() {
        let json = r#"[
            {"name_value": "www.example.com\nexample.com"},
            {"name_value": "*.api.example.com"},
            {"name_value": "MAIL.example.com\nwww.example.com"},
            {"name_value": "evil-example.com\nexample.com.attacker.net"}
        ]"#;
        let entries: Vec<CertificateEntry> = serde_json::from_str(json).unwrap();
        let names = collect_subdomains(entries.into_iter().map(|e| e.name_value), "example.com");
        assert_eq!(names, vec!["www.example.com", "api.example.com", "mail.example.com"]);
    }

    #[test]
    fn empty_log_yields_no_subdomains() {
        assert!(collect_subdomains(Vec::<String>::new(), "example.com").is_empty());
    }
}
