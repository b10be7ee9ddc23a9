// src/core/scanner/headers_scanner.rs

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{debug, info, warn};

use super::{HttpClient, HttpResponse};
use crate::config::ScannerConfig;
use crate::core::error::CollectorError;

/// HTTP collaborator backed by `reqwest`, following redirects. One request per
/// fetch: a failed HTTPS attempt is reported, not retried over plain HTTP.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ReqwestHttpClient {
    pub fn new(config: &ScannerConfig) -> Result<Self, CollectorError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.http_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client, max_body_bytes: config.max_body_bytes })
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let mut response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = header_pairs(response.headers());
        info!(url, status, final_url = %final_url, "Received HTTP response.");

        let body = match read_capped(&mut response, self.max_body_bytes).await {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!(url, error = %e, "Could not read response body.");
                None
            }
        };

        Ok(HttpResponse { status, final_url, headers, body })
    }
}

/// Header pairs in wire order. Non-UTF-8 values are kept lossily.
fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = match value.to_str() {
                Ok(s) => s.to_string(),
                Err(_) => {
                    warn!(header_name = %name, "Header contained invalid UTF-8.");
                    String::from_utf8_lossy(value.as_bytes()).into_owned()
                }
            };
            (name.as_str().to_string(), value)
        })
        .collect()
}

/// Reads at most `limit` bytes of the body.
async fn read_capped(response: &mut reqwest::Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit.saturating_sub(body.len());
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!(limit, "Response body truncated.");
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn fetch(&self, host: &str) -> Result<HttpResponse, CollectorError> {
        let url = format!("https://{}/", host);
        self.get(&url).await.map_err(|e| {
            warn!(host, error = %e, "HTTPS request failed.");
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn failed_https_attempt_is_not_repeated() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            // Plain HTTP only, so the TLS handshake fails.
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                    .await;
            }
        });

        let client = ReqwestHttpClient::new(&ScannerConfig::default()).unwrap();
        let outcome = client.fetch(&addr.to_string()).await;

        assert!(matches!(outcome, Err(CollectorError::Http(_))));
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_utf8_header_values_are_kept_lossily() {
        let mut headers = HeaderMap::new();
        headers.insert("x-test", reqwest::header::HeaderValue::from_bytes(b"caf\xe9").unwrap());
        headers.insert("server", reqwest::header::HeaderValue::from_static("nginx"));
        let pairs = header_pairs(&headers);
        assert!(pairs.contains(&("server".to_string(), "nginx".to_string())));
        assert!(pairs.iter().any(|(name, value)| name == "x-test" && value.starts_with("caf")));
    }
}
