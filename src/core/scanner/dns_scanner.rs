// src/core/scanner/dns_scanner.rs

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::rr::{RData, RecordType};
use tracing::{debug, info, warn};

use super::DnsResolver;
use super::subdomain_scanner::CrtShClient;
use crate::config::ScannerConfig;
use crate::core::error::CollectorError;
use crate::core::models::MxRecord;

/// DNS resolver backed by hickory's Tokio resolver, with crt.sh for subdomain enumeration.
pub struct HickoryDnsResolver {
    resolver: TokioAsyncResolver,
    ct: CrtShClient,
    max_cname_depth: usize,
}

impl HickoryDnsResolver {
    pub fn new(config: &ScannerConfig) -> Result<Self, CollectorError> {
        let mut opts = ResolverOpts::default();
        opts.timeout = config.dns_timeout;
        opts.attempts = 1;

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
            ct: CrtShClient::new(config)?,
            max_cname_depth: config.max_cname_depth,
        })
    }
}

fn is_no_records(error: &ResolveError) -> bool {
    matches!(error.kind(), ResolveErrorKind::NoRecordsFound { .. })
}

/// Maps an NXDOMAIN/NODATA answer to an empty list.
fn empty_on_no_records<T: Default>(result: Result<T, ResolveError>, host: &str, record: &str) -> Result<T, CollectorError> {
    match result {
        Ok(records) => Ok(records),
        Err(e) if is_no_records(&e) => {
            debug!(host, record, "No records found.");
            Ok(T::default())
        }
        Err(e) => {
            warn!(host, record, error = %e, "DNS lookup failed.");
            Err(e.into())
        }
    }
}

fn strip_root(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn resolve_a(&self, host: &str) -> Result<Vec<String>, CollectorError> {
        debug!(host, "Looking up A records.");
        let lookup = self
            .resolver
            .ipv4_lookup(host)
            .await
            .map(|l| l.iter().map(|a| a.to_string()).collect::<Vec<_>>());
        empty_on_no_records(lookup, host, "A")
    }

    async fn resolve_aaaa(&self, host: &str) -> Result<Vec<String>, CollectorError> {
        debug!(host, "Looking up AAAA records.");
        let lookup = self
            .resolver
            .ipv6_lookup(host)
            .await
            .map(|l| l.iter().map(|aaaa| aaaa.to_string()).collect::<Vec<_>>());
        empty_on_no_records(lookup, host, "AAAA")
    }

    async fn resolve_cname(&self, host: &str) -> Result<Vec<String>, CollectorError> {
        debug!(host, "Following CNAME chain.");
        let mut chain: Vec<String> = Vec::new();
        let mut current = host.to_string();

        for _ in 0..self.max_cname_depth {
            let lookup = match self.resolver.lookup(current.as_str(), RecordType::CNAME).await {
                Ok(lookup) => lookup,
                Err(e) if is_no_records(&e) => break,
                Err(e) if chain.is_empty() => return Err(e.into()),
                Err(e) => {
                    warn!(host = %current, error = %e, "CNAME chain lookup stopped early.");
                    break;
                }
            };

            let next = lookup.iter().find_map(|rdata| match rdata {
                RData::CNAME(name) => Some(strip_root(&name.to_string())),
                _ => None,
            });
            let Some(next) = next else { break };

            if next == host || chain.contains(&next) {
                warn!(host, target = %next, "CNAME loop detected.");
                break;
            }
            chain.push(next.clone());
            current = next;
        }

        debug!(host, depth = chain.len(), "CNAME chain resolved.");
        Ok(chain)
    }

    async fn resolve_mx(&self, host: &str) -> Result<Vec<MxRecord>, CollectorError> {
        debug!(host, "Looking up MX records.");
        let lookup = self.resolver.mx_lookup(host).await.map(|l| {
            let mut records: Vec<MxRecord> = l
                .iter()
                .map(|mx| MxRecord { preference: mx.preference(), exchange: strip_root(&mx.exchange().to_string()) })
                .collect();
            records.sort_by(|a, b| a.preference.cmp(&b.preference).then_with(|| a.exchange.cmp(&b.exchange)));
            records
        });
        empty_on_no_records(lookup, host, "MX")
    }

    async fn resolve_ns(&self, host: &str) -> Result<Vec<String>, CollectorError> {
        debug!(host, "Looking up NS records.");
        let lookup = self
            .resolver
            .ns_lookup(host)
            .await
            .map(|l| l.iter().map(|ns| strip_root(&ns.to_string())).collect::<Vec<_>>());
        empty_on_no_records(lookup, host, "NS")
    }

    async fn resolve_txt(&self, host: &str) -> Result<Vec<String>, CollectorError> {
        debug!(host, "Looking up TXT records.");
        let lookup = self
            .resolver
            .txt_lookup(host)
            .await
            .map(|l| l.iter().map(|txt| txt.to_string()).collect::<Vec<_>>());
        empty_on_no_records(lookup, host, "TXT")
    }

    async fn reverse_lookup(&self, ip: &str) -> Result<Vec<String>, CollectorError> {
        let addr: IpAddr = ip
            .parse()
            .map_err(|_| CollectorError::Other(format!("'{}' is not an IP address", ip)))?;
        debug!(ip, "Performing reverse lookup.");
        let lookup = self
            .resolver
            .reverse_lookup(addr)
            .await
            .map(|l| l.iter().map(|ptr| strip_root(&ptr.to_string())).collect::<Vec<_>>());
        empty_on_no_records(lookup, ip, "PTR")
    }

    async fn enumerate_subdomains(&self, domain: &str) -> Result<Vec<String>, CollectorError> {
        let names = self.ct.enumerate(domain).await?;
        info!(domain, count = names.len(), "Certificate transparency enumeration finished.");
        Ok(names)
    }
}
