// src/core/scanner/mod.rs

// Network collaborators used by the orchestrator. Each one sits behind a trait
// so scans can run against in-memory fakes in tests.
pub mod dns_scanner;
pub mod geo_scanner;
pub mod headers_scanner;
pub mod ssl_scanner;
pub mod subdomain_scanner;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ScannerConfig;
use crate::core::error::CollectorError;
use crate::core::models::{Geolocation, MxRecord, TlsFindings};

use self::dns_scanner::HickoryDnsResolver;
use self::geo_scanner::PassiveGeoLocator;
use self::headers_scanner::ReqwestHttpClient;
use self::ssl_scanner::NativeTlsClient;

/// DNS lookups plus certificate-transparency subdomain enumeration.
///
/// "No records" is an empty list, not an error.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve_a(&self, host: &str) -> Result<Vec<String>, CollectorError>;

    /// The CNAME chain starting at `host`, in resolution order.
    async fn resolve_cname(&self, host: &str) -> Result<Vec<String>, CollectorError>;

    async fn reverse_lookup(&self, ip: &str) -> Result<Vec<String>, CollectorError>;

    async fn enumerate_subdomains(&self, domain: &str) -> Result<Vec<String>, CollectorError>;

    async fn resolve_aaaa(&self, _host: &str) -> Result<Vec<String>, CollectorError> {
        Ok(Vec::new())
    }

    async fn resolve_mx(&self, _host: &str) -> Result<Vec<MxRecord>, CollectorError> {
        Ok(Vec::new())
    }

    async fn resolve_ns(&self, _host: &str) -> Result<Vec<String>, CollectorError> {
        Ok(Vec::new())
    }

    async fn resolve_txt(&self, _host: &str) -> Result<Vec<String>, CollectorError> {
        Ok(Vec::new())
    }
}

/// Raw HTTP response as seen by the core.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub final_url: String,
    /// Header pairs in arrival order; names may repeat.
    pub headers: Vec<(String, String)>,
    /// `None` when the body could not be read.
    pub body: Option<String>,
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn fetch(&self, host: &str) -> Result<HttpResponse, CollectorError>;
}

#[async_trait]
pub trait TlsClient: Send + Sync {
    async fn fetch_certificate(&self, host: &str) -> Result<TlsFindings, CollectorError>;
}

#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self, ip: &str) -> Result<Geolocation, CollectorError>;
}

/// The set of collaborators one orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub dns: Arc<dyn DnsResolver>,
    pub http: Arc<dyn HttpClient>,
    pub tls: Arc<dyn TlsClient>,
    pub geo: Arc<dyn GeoLocator>,
}

impl Collaborators {
    /// Builds the real network-backed collaborators.
    pub fn live(config: &ScannerConfig) -> Result<Self, CollectorError> {
        Ok(Self {
            dns: Arc::new(HickoryDnsResolver::new(config)?),
            http: Arc::new(ReqwestHttpClient::new(config)?),
            tls: Arc::new(NativeTlsClient::new(config)),
            geo: Arc::new(PassiveGeoLocator),
        })
    }
}
