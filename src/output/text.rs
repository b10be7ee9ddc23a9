// src/output/text.rs

use std::fmt::Write;

use crate::core::knowledge_base::{header_score, missing_headers};
use crate::core::models::{Label, ScanResult};

const RULE_WIDTH: usize = 80;

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDTH));
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
}

fn label_line(out: &mut String, name: &str, label: Option<&Label>) {
    match label {
        Some(l) => {
            let _ = writeln!(out, "  {:<16}{} ({}: {})", name, l.name, l.source, l.evidence);
        }
        None => {
            let _ = writeln!(out, "  {:<16}not detected", name);
        }
    }
}

/// Renders the human-readable report used for the console and the text file.
pub fn render(result: &ScanResult) -> String {
    let mut out = String::new();

    section(&mut out, &format!("RECON REPORT: {}", result.domain));
    let _ = writeln!(out, "  Scanned at: {}", result.scanned_at.format("%Y-%m-%d %H:%M:%S UTC"));

    section(&mut out, "HTTP");
    match &result.http {
        Some(http) => {
            let _ = writeln!(out, "  Status:     {}", http.status);
            let _ = writeln!(out, "  Final URL:  {}", http.final_url);
            if let Some(server) = http.headers.get("server") {
                let _ = writeln!(out, "  Server:     {}", server);
            }
        }
        None => out.push_str("  No HTTP data.\n"),
    }

    section(&mut out, "TECHNOLOGY STACK");
    if result.technologies.is_empty() {
        out.push_str("  No technologies detected.\n");
    }
    for tech in &result.technologies {
        let version = tech.version.as_deref().map(|v| format!(" {}", v)).unwrap_or_default();
        let _ = writeln!(out, "  [{}] {}{}", tech.category, tech.name, version);
    }

    section(&mut out, "INFRASTRUCTURE");
    label_line(&mut out, "CDN:", result.cdn.as_ref());
    label_line(&mut out, "WAF:", result.waf.as_ref());
    label_line(&mut out, "Cloud:", result.cloud_provider.as_ref());
    if let Some(geo) = &result.geolocation {
        let _ = writeln!(out, "  {:<16}{}", "IP:", geo.ip);
        if let Some(country) = &geo.country {
            let _ = writeln!(out, "  {:<16}{}", "Country:", country);
        }
    }

    section(&mut out, "DNS");
    match &result.dns {
        Some(dns) => {
            for (name, records) in [("A", &dns.a), ("AAAA", &dns.aaaa), ("CNAME", &dns.cname), ("NS", &dns.ns), ("TXT", &dns.txt)] {
                if !records.is_empty() {
                    let _ = writeln!(out, "  {:<6}{}", name, records.join(", "));
                }
            }
            for mx in &dns.mx {
                let _ = writeln!(out, "  {:<6}{} {}", "MX", mx.preference, mx.exchange);
            }
        }
        None => out.push_str("  No DNS data.\n"),
    }

    section(&mut out, "TLS CERTIFICATE");
    match &result.tls {
        Some(tls) => {
            let cert = &tls.certificate_info;
            let _ = writeln!(out, "  Subject:    {}", cert.subject_name);
            let _ = writeln!(out, "  Issuer:     {}", cert.issuer_name);
            let _ = writeln!(out, "  Valid:      {} ({} days until expiry)", tls.is_valid, cert.days_until_expiry);
            let _ = writeln!(out, "  Not after:  {}", cert.not_after.format("%Y-%m-%d"));
            let key = cert.key_size.map(|k| format!(" {} bits", k)).unwrap_or_default();
            let _ = writeln!(out, "  Key:        {}{}", cert.public_key_algorithm, key);
            if !cert.san.is_empty() {
                let _ = writeln!(out, "  SAN:        {}", cert.san.join(", "));
            }
        }
        None => out.push_str("  No TLS data.\n"),
    }

    section(&mut out, "SECURITY HEADERS");
    let (found, total) = header_score(&result.security_headers);
    let _ = writeln!(out, "  Score: {}/{}", found, total);
    for (name, value) in &result.security_headers {
        let _ = writeln!(out, "  [+] {}: {}", name, value);
    }
    if result.http.is_some() {
        for detail in missing_headers(&result.security_headers) {
            let _ = writeln!(out, "  [-] {} ({}) missing [{}]", detail.title, detail.header, detail.severity);
            let _ = writeln!(out, "      {}", detail.description);
            let _ = writeln!(out, "      Fix: {}", detail.remediation);
        }
    }

    section(&mut out, &format!("SUBDOMAINS ({})", result.subdomains.len()));
    for subdomain in &result.subdomains {
        let _ = writeln!(out, "  {}", subdomain);
    }

    if !result.warnings.is_empty() {
        section(&mut out, "WARNINGS");
        for warning in &result.warnings {
            let _ = writeln!(out, "  [!] {}: {}", warning.phase, warning.message);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{EvidenceSource, HttpFindings, Phase, PhaseWarning};

    #[test]
    fn renders_labels_headers_and_warnings() {
        let mut result = ScanResult::new("example.com");
        result.http = Some(HttpFindings { status: 200, final_url: "https://example.com/".into(), ..Default::default() });
        result.cdn = Some(Label { name: "Cloudflare".into(), source: EvidenceSource::Header, evidence: "cf-ray: abc".into() });
        result.security_headers.insert("x-frame-options".into(), "DENY".into());
        result.warnings.push(PhaseWarning { phase: Phase::Tls, message: "handshake failed".into() });

        let report = render(&result);
        assert!(report.contains("RECON REPORT: example.com"));
        assert!(report.contains("Cloudflare (header: cf-ray: abc)"));
        assert!(report.contains("[+] x-frame-options: DENY"));
        assert!(report.contains("[-] HSTS (strict-transport-security) missing [WARNING]"));
        assert!(report.contains("protects against protocol downgrade attacks"));
        assert!(report.contains("Fix: Add the 'Strict-Transport-Security' header"));
        assert!(!report.contains("X-Frame-Options (x-frame-options) missing"));
        assert!(report.contains("Score: 1/7"));
        assert!(report.contains("[!] tls: handshake failed"));
        assert!(report.contains("No TLS data."));
    }

    #[test]
    fn no_missing_header_list_without_http() {
        let report = render(&ScanResult::new("example.com"));
        assert!(report.contains("No HTTP data."));
        assert!(!report.contains("[-]"));
    }
}
