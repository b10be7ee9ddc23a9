// src/core/scanner/geo_scanner.rs

use async_trait::async_trait;
use tracing::debug;

use super::GeoLocator;
use crate::core::error::CollectorError;
use crate::core::models::Geolocation;

/// Offline locator. It records the address and leaves country, city and ISP
/// unknown; no third-party lookup service is contacted.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveGeoLocator;

#[async_trait]
impl GeoLocator for PassiveGeoLocator {
    async fn locate(&self, ip: &str) -> Result<Geolocation, CollectorError> {
        debug!(ip, "Recording address without an external geolocation lookup.");
        Ok(Geolocation { ip: ip.to_string(), ..Geolocation::default() })
    }
}
