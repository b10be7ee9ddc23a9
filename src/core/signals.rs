// src/core/signals.rs

//! Pure extractors that pull candidate signals out of raw collaborator output.

use std::collections::BTreeMap;

use tracing::debug;
use url::{Host, Url};

use crate::core::error::ScanError;
use crate::core::models::Geolocation;

/// Security-relevant response headers, lower-cased.
pub const SECURITY_HEADERS: &[&str] = &[
    "strict-transport-security",
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "x-xss-protection",
    "referrer-policy",
    "permissions-policy",
];

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Reduces a bare hostname or a URL to a lower-case hostname.
///
/// `example.com`, `https://Example.com/path` and `example.com:8443` all normalize
/// to `example.com`.
pub fn normalize_target(input: &str) -> Result<String, ScanError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScanError::EmptyTarget);
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|_| ScanError::InvalidTarget(trimmed.to_string()))?;
    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_ascii_lowercase(),
        Some(Host::Ipv4(ip)) => return Ok(ip.to_string()),
        Some(Host::Ipv6(ip)) => return Ok(ip.to_string()),
        None => return Err(ScanError::InvalidTarget(trimmed.to_string())),
    };

    validate_hostname(&host)?;
    debug!(input = trimmed, host = %host, "Normalized target.");
    Ok(host)
}

fn validate_hostname(host: &str) -> Result<(), ScanError> {
    let invalid = |reason| ScanError::InvalidHostname { host: host.to_string(), reason };

    if host.is_empty() {
        return Err(invalid("empty hostname"));
    }
    if host.len() > MAX_HOSTNAME_LEN {
        return Err(invalid("longer than 253 characters"));
    }
    for label in host.split('.') {
        if label.is_empty() {
            return Err(invalid("empty label"));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(invalid("label longer than 63 characters"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(invalid("label starts or ends with a hyphen"));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(invalid("label contains invalid characters"));
        }
    }
    Ok(())
}

/// Builds the header mapping: names lower-cased, a repeated name keeps its last value.
pub fn normalize_headers<I, K, V>(raw: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    raw.into_iter()
        .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
        .collect()
}

/// Every `Set-Cookie` value in wire order. The header map keeps only the last
/// one, so cookie rules read this list instead.
pub fn collect_cookies<K, V>(raw: &[(K, V)]) -> Vec<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    raw.iter()
        .filter(|(name, _)| name.as_ref().eq_ignore_ascii_case("set-cookie"))
        .map(|(_, value)| value.as_ref().to_string())
        .collect()
}

/// Returns the subset of `headers` whose names are in [`SECURITY_HEADERS`].
///
/// Lookup is case-insensitive. Headers missing from the response are missing
/// from the subset, so a response without any of them yields an empty map.
pub fn extract_security_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let lowered: BTreeMap<String, &String> = headers
        .iter()
        .map(|(name, value)| (name.to_ascii_lowercase(), value))
        .collect();

    SECURITY_HEADERS
        .iter()
        .filter_map(|name| lowered.get(*name).map(|value| (name.to_string(), (*value).clone())))
        .collect()
}

/// Keeps at most `max` subdomains, in discovery order.
pub fn truncate_subdomains(mut discovered: Vec<String>, max: usize) -> Vec<String> {
    discovered.truncate(max);
    discovered
}

/// First hostname of a reverse lookup, without the trailing root dot.
pub fn reverse_hostname(hostnames: &[String]) -> Option<String> {
    hostnames
        .iter()
        .map(|h| h.trim().trim_end_matches('.').to_ascii_lowercase())
        .find(|h| !h.is_empty())
}

/// ISP string used for cloud-provider detection; empty when unknown.
pub fn isp_string(geolocation: Option<&Geolocation>) -> &str {
    geolocation.and_then(|g| g.isp.as_deref()).unwrap_or("")
}
