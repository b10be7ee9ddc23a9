//! Static, read-only explanations for the security headers the scanner audits.
//! Reports and the UI look entries up by header name to tell the user what a
//! missing header means and how to add it.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::signals::SECURITY_HEADERS;

/// How much a missing header matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// Human-readable information about one security header.
pub struct HeaderDetail {
    /// Lower-case header name, as stored in `ScanResult::security_headers`.
    pub header: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    /// What the header protects against.
    pub description: &'static str,
    /// How to deploy it.
    pub remediation: &'static str,
}

static HEADERS: &[HeaderDetail] = &[
    HeaderDetail {
        header: "strict-transport-security",
        title: "HSTS",
        severity: Severity::Warning,
        description: "The HTTP Strict-Transport-Security (HSTS) header instructs browsers to only communicate with your site over HTTPS. It protects against protocol downgrade attacks and cookie hijacking.",
        remediation: "Add the 'Strict-Transport-Security' header to your web server responses. A strong value is 'max-age=31536000; includeSubDomains; preload'.",
    },
    HeaderDetail {
        header: "content-security-policy",
        title: "Content Security Policy",
        severity: Severity::Warning,
        description: "Content-Security-Policy (CSP) helps prevent Cross-Site Scripting (XSS) and data injection by defining which resources a browser is allowed to load.",
        remediation: "Implement a Content-Security-Policy header that defines trusted sources for scripts, styles and other assets. Start with a restrictive policy and open it up as needed.",
    },
    HeaderDetail {
        header: "x-frame-options",
        title: "X-Frame-Options",
        severity: Severity::Warning,
        description: "This header protects your visitors against 'clickjacking' attacks, where an attacker loads your site in an invisible iframe to trick users into clicking on malicious content.",
        remediation: "Add the 'X-Frame-Options' header and set it to 'DENY' (no framing allowed) or 'SAMEORIGIN' (only you can frame your site).",
    },
    HeaderDetail {
        header: "x-content-type-options",
        title: "X-Content-Type-Options",
        severity: Severity::Info,
        description: "This header prevents browsers from guessing the content type of a file (MIME sniffing), so a file disguised as an image cannot be executed as a script.",
        remediation: "Add the 'X-Content-Type-Options' header and set its value to 'nosniff'.",
    },
    HeaderDetail {
        header: "x-xss-protection",
        title: "X-XSS-Protection",
        severity: Severity::Info,
        description: "A legacy header that enabled the reflected-XSS filter in older browsers. Modern browsers ignore it, but scanners and auditors still look for it.",
        remediation: "Set 'X-XSS-Protection: 0' to disable the buggy legacy filter and rely on a Content-Security-Policy instead.",
    },
    HeaderDetail {
        header: "referrer-policy",
        title: "Referrer Policy",
        severity: Severity::Info,
        description: "Referrer-Policy controls how much of the current URL is sent in the Referer header when users follow links, which can leak tokens or internal paths to third parties.",
        remediation: "Add 'Referrer-Policy: strict-origin-when-cross-origin' or a stricter value such as 'no-referrer'.",
    },
    HeaderDetail {
        header: "permissions-policy",
        title: "Permissions Policy",
        severity: Severity::Info,
        description: "Permissions-Policy restricts which browser features (camera, microphone, geolocation, ...) the page and its embedded frames may use.",
        remediation: "Add a Permissions-Policy header that disables features you do not use, for example 'camera=(), microphone=(), geolocation=()'.",
    },
];

/// Looks up the detail entry for a header name (case-insensitive).
pub fn get_header_detail(header: &str) -> Option<&'static HeaderDetail> {
    HEADERS.iter().find(|d| d.header.eq_ignore_ascii_case(header))
}

/// Audited headers absent from `present`, in audit order.
pub fn missing_headers(present: &BTreeMap<String, String>) -> Vec<&'static HeaderDetail> {
    SECURITY_HEADERS
        .iter()
        .filter(|name| !present.contains_key(**name))
        .filter_map(|name| get_header_detail(name))
        .collect()
}

/// Present and total audited header counts.
pub fn header_score(present: &BTreeMap<String, String>) -> (usize, usize) {
    let found = SECURITY_HEADERS.iter().filter(|name| present.contains_key(**name)).count();
    (found, SECURITY_HEADERS.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_audited_header_is_documented() {
        for name in SECURITY_HEADERS {
            assert!(get_header_detail(name).is_some(), "no entry for {}", name);
        }
        assert_eq!(HEADERS.len(), SECURITY_HEADERS.len());
    }

    #[test]
    fn missing_headers_follow_audit_order() {
        let mut present = BTreeMap::new();
        present.insert("content-security-policy".to_string(), "default-src 'self'".to_string());

        let missing: Vec<&str> = missing_headers(&present).iter().map(|d| d.header).collect();
        assert_eq!(missing.len(), SECURITY_HEADERS.len() - 1);
        assert_eq!(missing[0], "strict-transport-security");
        assert!(!missing.contains(&"content-security-policy"));
        assert_eq!(header_score(&present), (1, SECURITY_HEADERS.len()));
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(get_header_detail("X-Frame-Options").unwrap().title, "X-Frame-Options");
    }
}
