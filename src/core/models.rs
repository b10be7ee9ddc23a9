// src/core/models.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

// --- Scan Phases ---

/// The fixed, linear sequence of analysis phases run against one target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Identity,
    Http,
    Technology,
    Dns,
    EdgeDetection,
    Tls,
    Subdomains,
    Geolocation,
}

impl Phase {
    /// Human-readable progress line shown when the phase starts.
    pub fn progress_label(self) -> &'static str {
        match self {
            Phase::Identity => "Establishing target identity...",
            Phase::Http => "Analyzing HTTP headers...",
            Phase::Technology => "Detecting technologies...",
            Phase::Dns => "Analyzing DNS records...",
            Phase::EdgeDetection => "Detecting CDN and WAF...",
            Phase::Tls => "Analyzing TLS certificate...",
            Phase::Subdomains => "Discovering subdomains (Certificate Transparency)...",
            Phase::Geolocation => "Analyzing geolocation...",
        }
    }
}

/// A recovered phase-local failure, kept so the report shows which phases failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseWarning {
    pub phase: Phase,
    pub message: String,
}

// --- Finding Labels ---

/// Where the evidence for a label was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvidenceSource {
    Header,
    Cookie,
    Cname,
    Body,
    MetaTag,
    ScriptSrc,
    LinkHref,
    Hostname,
    Isp,
}

/// A single-valued classification (CDN, WAF, cloud provider) and the evidence that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub source: EvidenceSource,
    pub evidence: String,
}

/// A detected technology (e.g. a web server, CMS or JS framework).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Technology {
    pub name: String,
    pub category: String,
    pub version: Option<String>,
    pub source: EvidenceSource,
    pub evidence: String,
}

// --- HTTP ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpFindings {
    pub status: u16,
    pub final_url: String,
    /// Lower-cased header names; a repeated header keeps its last value.
    pub headers: BTreeMap<String, String>,
    /// Every `Set-Cookie` value, in the order received.
    pub cookies: Vec<String>,
    /// Response body snapshot, used for technology detection only.
    #[serde(skip)]
    pub body: Option<String>,
}

// --- DNS ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnsFindings {
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
    pub cname: Vec<String>,
    pub mx: Vec<MxRecord>,
    pub ns: Vec<String>,
    pub txt: Vec<String>,
}

// --- TLS ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateInfo {
    pub subject_name: String,
    pub issuer_name: String,
    pub common_name: Option<String>,
    pub san: Vec<String>,
    pub serial_number: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
    pub signature_algorithm: String,
    pub public_key_algorithm: String,
    pub key_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TlsFindings {
    pub is_valid: bool,
    pub certificate_info: CertificateInfo,
}

// --- Geolocation ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Geolocation {
    pub ip: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
}

// --- Main Report ---

/// Root aggregate for one scanned domain.
///
/// Built by the orchestrator phase by phase. Everything except `domain` and
/// `scanned_at` starts empty and stays empty when the owning phase fails or is skipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanResult {
    pub domain: String,
    pub scanned_at: DateTime<Utc>,
    pub http: Option<HttpFindings>,
    pub dns: Option<DnsFindings>,
    pub tls: Option<TlsFindings>,
    pub subdomains: Vec<String>,
    pub security_headers: BTreeMap<String, String>,
    pub technologies: Vec<Technology>,
    pub cdn: Option<Label>,
    pub waf: Option<Label>,
    pub cloud_provider: Option<Label>,
    pub geolocation: Option<Geolocation>,
    pub warnings: Vec<PhaseWarning>,
}

impl ScanResult {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            scanned_at: Utc::now(),
            http: None,
            dns: None,
            tls: None,
            subdomains: Vec::new(),
            security_headers: BTreeMap::new(),
            technologies: Vec::new(),
            cdn: None,
            waf: None,
            cloud_provider: None,
            geolocation: None,
            warnings: Vec::new(),
        }
    }

    /// Whether the given phase recorded a warning during this scan.
    pub fn phase_failed(&self, phase: Phase) -> bool {
        self.warnings.iter().any(|w| w.phase == phase)
    }
}
