// src/core/scanner/ssl_scanner.rs

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};
use x509_parser::der_parser::oid::Oid;
use x509_parser::oid_registry::{OID_KEY_TYPE_EC_PUBLIC_KEY, OID_PKCS1_RSAENCRYPTION};
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use super::TlsClient;
use crate::config::ScannerConfig;
use crate::core::error::CollectorError;
use crate::core::models::{CertificateInfo, TlsFindings};

const TLS_PORT: u16 = 443;

/// Fetches the leaf certificate over a blocking native-tls handshake.
///
/// Invalid chains and hostnames are accepted on purpose: the certificate is
/// what we want to look at, not whether it verifies.
pub struct NativeTlsClient {
    timeout: Duration,
}

impl NativeTlsClient {
    pub fn new(config: &ScannerConfig) -> Self {
        Self { timeout: config.tls_timeout }
    }
}

#[async_trait]
impl TlsClient for NativeTlsClient {
    async fn fetch_certificate(&self, host: &str) -> Result<TlsFindings, CollectorError> {
        info!(host, "Starting TLS certificate fetch.");
        let host_owned = host.to_string();
        let timeout = self.timeout;

        debug!("Spawning blocking task for TLS connection.");
        let findings = spawn_blocking(move || perform_tls_handshake(&host_owned, timeout)).await??;

        info!(host, days_until_expiry = findings.certificate_info.days_until_expiry, "TLS certificate fetched.");
        Ok(findings)
    }
}

fn perform_tls_handshake(host: &str, timeout: Duration) -> Result<TlsFindings, CollectorError> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to create TlsConnector");
            CollectorError::Tls(format!("connector: {}", e))
        })?;

    let addr = (host, TLS_PORT)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| CollectorError::Tls(format!("no address for {}", host)))?;

    debug!(host, %addr, "Connecting TCP stream to port 443.");
    let stream = TcpStream::connect_timeout(&addr, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    debug!(host, "Performing TLS handshake.");
    let stream = connector.connect(host, stream).map_err(|e| {
        error!(error = %e, "TLS handshake failed");
        CollectorError::Tls(format!("handshake: {}", e))
    })?;

    let cert = stream
        .peer_certificate()
        .map_err(|e| CollectorError::Tls(format!("peer certificate: {}", e)))?
        .ok_or_else(|| CollectorError::Tls("server presented no certificate".to_string()))?;

    let der = cert
        .to_der()
        .map_err(|e| CollectorError::Certificate(format!("DER conversion: {}", e)))?;

    parse_certificate(&der, Utc::now())
}

/// Turns a DER-encoded leaf certificate into findings, evaluated at `now`.
fn parse_certificate(der: &[u8], now: DateTime<Utc>) -> Result<TlsFindings, CollectorError> {
    let (_, x509) = parse_x509_certificate(der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate");
        CollectorError::Certificate(e.to_string())
    })?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");

    let validity = x509.validity();
    let not_before = asn1_time_to_chrono_utc(&validity.not_before);
    let not_after = asn1_time_to_chrono_utc(&validity.not_after);
    let days_until_expiry = not_after.signed_duration_since(now).num_days();
    let is_valid = now > not_before && now < not_after;

    let common_name = x509
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string);

    let san = match x509.subject_alternative_name() {
        Ok(Some(ext)) => ext
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let spki = x509.public_key();
    let key_size = match spki.parsed() {
        Ok(PublicKey::RSA(rsa)) => Some(rsa.key_size()),
        Ok(PublicKey::EC(ec)) => Some(ec.key_size()),
        _ => None,
    };
    let public_key_algorithm = match &spki.algorithm.algorithm {
        oid if *oid == OID_PKCS1_RSAENCRYPTION => "RSA".to_string(),
        oid if *oid == OID_KEY_TYPE_EC_PUBLIC_KEY => "EC".to_string(),
        oid => oid_name(oid),
    };

    Ok(TlsFindings {
        is_valid,
        certificate_info: CertificateInfo {
            subject_name: x509.subject().to_string(),
            issuer_name: x509.issuer().to_string(),
            common_name,
            san,
            serial_number: x509.raw_serial_as_string(),
            not_before,
            not_after,
            days_until_expiry,
            signature_algorithm: oid_name(&x509.signature_algorithm.algorithm),
            public_key_algorithm,
            key_size,
        },
    })
}

fn oid_name(oid: &Oid) -> String {
    oid2sn(oid, oid_registry()).map(str::to_string).unwrap_or_else(|_| oid.to_id_string())
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_der_is_a_certificate_error() {
        let result = parse_certificate(b"not a certificate", Utc::now());
        assert!(matches!(result, Err(CollectorError::Certificate(_))));
    }

    #[test]
    fn asn1_epoch_converts() {
        let time = ASN1Time::from_timestamp(1_700_000_000).unwrap();
        assert_eq!(asn1_time_to_chrono_utc(&time).timestamp(), 1_700_000_000);
    }
}
