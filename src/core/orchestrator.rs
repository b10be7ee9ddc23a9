// src/core/orchestrator.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::ScannerConfig;
use crate::core::error::{CollectorError, ScanError};
use crate::core::fingerprint::cdn::detect_cdn;
use crate::core::fingerprint::cloud::detect_cloud_provider;
use crate::core::fingerprint::technology::detect_technologies;
use crate::core::fingerprint::waf::detect_waf;
use crate::core::models::{DnsFindings, Geolocation, HttpFindings, Phase, PhaseWarning, ScanResult};
use crate::core::observer::ScanObserver;
use crate::core::scanner::Collaborators;
use crate::core::signals::{
    collect_cookies, extract_security_headers, isp_string, normalize_headers, normalize_target,
    reverse_hostname, truncate_subdomains,
};

/// One step of the scan pipeline.
#[derive(Debug, Clone, Copy)]
pub struct PhaseSpec {
    pub phase: Phase,
    /// Phases that must have completed for this one to run.
    pub depends_on: &'static [Phase],
    /// A fatal phase aborts the scan instead of recording a warning.
    pub fatal: bool,
}

const fn spec(phase: Phase, depends_on: &'static [Phase], fatal: bool) -> PhaseSpec {
    PhaseSpec { phase, depends_on, fatal }
}

/// The fixed phase order. Only identity is fatal.
pub const PIPELINE: &[PhaseSpec] = &[
    spec(Phase::Identity, &[], true),
    spec(Phase::Http, &[Phase::Identity], false),
    spec(Phase::Technology, &[Phase::Http], false),
    spec(Phase::Dns, &[Phase::Identity], false),
    spec(Phase::EdgeDetection, &[Phase::Http, Phase::Dns], false),
    spec(Phase::Tls, &[Phase::Identity], false),
    spec(Phase::Subdomains, &[Phase::Identity], false),
    spec(Phase::Geolocation, &[Phase::Dns], false),
];

#[derive(Debug, Error)]
enum PhaseError {
    #[error(transparent)]
    Fatal(#[from] ScanError),
    #[error(transparent)]
    Collector(#[from] CollectorError),
}

/// Runs the phase pipeline for one target at a time.
///
/// Each call to [`Orchestrator::run_scan`] builds a fresh [`ScanResult`]; nothing
/// is carried over between scans.
pub struct Orchestrator {
    collaborators: Collaborators,
    config: ScannerConfig,
    observer: Arc<dyn ScanObserver>,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, config: ScannerConfig, observer: Arc<dyn ScanObserver>) -> Self {
        Self { collaborators, config, observer }
    }

    pub async fn run_scan(&self, target: &str) -> Result<ScanResult, ScanError> {
        self.run_pipeline(PIPELINE, target).await
    }

    async fn run_pipeline(&self, pipeline: &[PhaseSpec], target: &str) -> Result<ScanResult, ScanError> {
        let mut result = ScanResult::new(target.trim());
        let mut completed: BTreeSet<Phase> = BTreeSet::new();

        for step in pipeline {
            let phase = step.phase;

            if let Some(missing) = step.depends_on.iter().find(|dep| !completed.contains(dep)) {
                let reason = format!("{} phase did not complete", missing);
                debug!(%phase, %reason, "Skipping phase.");
                self.observer.phase_skipped(phase, &reason);
                continue;
            }
            if let Some(reason) = precondition(phase, &result) {
                debug!(%phase, reason, "Skipping phase.");
                self.observer.phase_skipped(phase, reason);
                continue;
            }

            info!(%phase, domain = %result.domain, "{}", phase.progress_label());
            self.observer.phase_started(phase);

            match self.run_phase(phase, &mut result).await {
                Ok(summary) => {
                    debug!(%phase, %summary, "Phase completed.");
                    completed.insert(phase);
                    self.observer.phase_completed(phase, &summary);
                }
                Err(e) if step.fatal => {
                    error!(%phase, error = %e, "Fatal phase failed, aborting scan.");
                    return Err(match e {
                        PhaseError::Fatal(e) => e,
                        PhaseError::Collector(source) => ScanError::PhaseFailed { phase, source },
                    });
                }
                Err(e) => {
                    warn!(%phase, domain = %result.domain, error = %e, "Phase failed, continuing.");
                    let warning = PhaseWarning { phase, message: e.to_string() };
                    self.observer.phase_warning(&warning);
                    result.warnings.push(warning);
                }
            }
        }

        info!(domain = %result.domain, warnings = result.warnings.len(), "Scan finished.");
        Ok(result)
    }

    async fn run_phase(&self, phase: Phase, result: &mut ScanResult) -> Result<String, PhaseError> {
        match phase {
            Phase::Identity => self.identity(result),
            Phase::Http => self.http(result).await,
            Phase::Technology => Ok(self.technology(result)),
            Phase::Dns => self.dns(result).await,
            Phase::EdgeDetection => Ok(self.edge_detection(result)),
            Phase::Tls => self.tls(result).await,
            Phase::Subdomains => self.subdomains(result).await,
            Phase::Geolocation => self.geolocation(result).await,
        }
    }

    fn identity(&self, result: &mut ScanResult) -> Result<String, PhaseError> {
        let host = normalize_target(&result.domain)?;
        *result = ScanResult::new(host);
        Ok(format!("target is {}", result.domain))
    }

    async fn http(&self, result: &mut ScanResult) -> Result<String, PhaseError> {
        let response = self.collaborators.http.fetch(&result.domain).await?;
        let cookies = collect_cookies(&response.headers);
        let headers = normalize_headers(response.headers);
        result.security_headers = extract_security_headers(&headers);
        let summary = format!(
            "HTTP {} with {} headers, {} security headers",
            response.status,
            headers.len(),
            result.security_headers.len()
        );
        result.http = Some(HttpFindings {
            status: response.status,
            final_url: response.final_url,
            headers,
            cookies,
            body: response.body,
        });
        Ok(summary)
    }

    fn technology(&self, result: &mut ScanResult) -> String {
        if let Some(http) = &result.http {
            let body = http.body.as_deref().unwrap_or_default();
            result.technologies = detect_technologies(body, &http.headers, &http.cookies);
        }
        format!("{} technologies detected", result.technologies.len())
    }

    async fn dns(&self, result: &mut ScanResult) -> Result<String, PhaseError> {
        let dns = &self.collaborators.dns;
        let host = result.domain.as_str();

        let (a, aaaa, cname, mx, ns, txt) = tokio::join!(
            dns.resolve_a(host),
            dns.resolve_aaaa(host),
            dns.resolve_cname(host),
            dns.resolve_mx(host),
            dns.resolve_ns(host),
            dns.resolve_txt(host),
        );

        let findings = DnsFindings {
            a: a?,
            aaaa: or_empty(aaaa, host, "AAAA"),
            cname: or_empty(cname, host, "CNAME"),
            mx: or_empty(mx, host, "MX"),
            ns: or_empty(ns, host, "NS"),
            txt: or_empty(txt, host, "TXT"),
        };
        let summary = format!(
            "{} A, {} AAAA, {} CNAME, {} MX, {} NS, {} TXT",
            findings.a.len(),
            findings.aaaa.len(),
            findings.cname.len(),
            findings.mx.len(),
            findings.ns.len(),
            findings.txt.len()
        );
        result.dns = Some(findings);
        Ok(summary)
    }

    fn edge_detection(&self, result: &mut ScanResult) -> String {
        let empty = Default::default();
        let headers = result.http.as_ref().map_or(&empty, |h| &h.headers);
        let cookies: &[String] = result.http.as_ref().map_or(&[], |h| h.cookies.as_slice());
        let body = result.http.as_ref().and_then(|h| h.body.as_deref());
        let cname: &[String] = result.dns.as_ref().map_or(&[], |d| d.cname.as_slice());

        let cdn = detect_cdn(headers, cname);
        let waf = detect_waf(headers, cookies, body);
        let summary = format!(
            "CDN: {}, WAF: {}",
            cdn.as_ref().map_or("none", |l| l.name.as_str()),
            waf.as_ref().map_or("none", |l| l.name.as_str())
        );
        result.cdn = cdn;
        result.waf = waf;
        summary
    }

    async fn tls(&self, result: &mut ScanResult) -> Result<String, PhaseError> {
        let findings = self.collaborators.tls.fetch_certificate(&result.domain).await?;
        let summary = format!(
            "certificate from {}, {} days until expiry",
            findings.certificate_info.issuer_name, findings.certificate_info.days_until_expiry
        );
        result.tls = Some(findings);
        Ok(summary)
    }

    async fn subdomains(&self, result: &mut ScanResult) -> Result<String, PhaseError> {
        let discovered = self.collaborators.dns.enumerate_subdomains(&result.domain).await?;
        let total = discovered.len();
        result.subdomains = truncate_subdomains(discovered, self.config.max_subdomains_display);
        Ok(format!("{} subdomains discovered, {} kept", total, result.subdomains.len()))
    }

    async fn geolocation(&self, result: &mut ScanResult) -> Result<String, PhaseError> {
        let Some(ip) = result.dns.as_ref().and_then(|d| d.a.first()).cloned() else {
            return Ok("no address".to_string());
        };

        let geolocation = match self.collaborators.geo.locate(&ip).await {
            Ok(geolocation) => geolocation,
            Err(e) => {
                warn!(ip, error = %e, "Geolocation lookup failed, keeping the bare address.");
                Geolocation { ip: ip.clone(), ..Geolocation::default() }
            }
        };
        result.geolocation = Some(geolocation);

        let hostnames = self.collaborators.dns.reverse_lookup(&ip).await?;
        let Some(hostname) = reverse_hostname(&hostnames) else {
            return Ok(format!("{} has no reverse hostname", ip));
        };

        let cloud = detect_cloud_provider(&ip, &hostname, isp_string(result.geolocation.as_ref()));
        let summary = format!(
            "{} reverses to {}, provider: {}",
            ip,
            hostname,
            cloud.as_ref().map_or("unknown", |l| l.name.as_str())
        );
        result.cloud_provider = cloud;
        Ok(summary)
    }
}

/// Why a phase whose dependencies completed still has nothing to work on.
fn precondition(phase: Phase, result: &ScanResult) -> Option<&'static str> {
    match phase {
        Phase::Technology if result.http.as_ref().and_then(|h| h.body.as_ref()).is_none() => {
            Some("no readable response body")
        }
        Phase::Geolocation if result.dns.as_ref().is_none_or(|d| d.a.is_empty()) => Some("no A records resolved"),
        _ => None,
    }
}

/// Secondary DNS records are best-effort: a failed lookup leaves the list empty.
fn or_empty<T>(lookup: Result<Vec<T>, CollectorError>, host: &str, record: &str) -> Vec<T> {
    lookup.unwrap_or_else(|e| {
        warn!(host, record, error = %e, "Secondary DNS lookup failed.");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::core::models::{CertificateInfo, TlsFindings};
    use crate::core::observer::{NullObserver, ScanEvent};
    use crate::core::scanner::geo_scanner::PassiveGeoLocator;
    use crate::core::scanner::{DnsResolver, HttpClient, HttpResponse, TlsClient};

    fn down() -> CollectorError {
        CollectorError::Other("unreachable".to_string())
    }

    #[derive(Default)]
    struct FakeDns {
        a: Vec<String>,
        cname: Vec<String>,
        ptr: Vec<String>,
        subdomains: Vec<String>,
        fail: bool,
        reverse_fail: bool,
    }

    impl FakeDns {
        fn answer<T: Clone>(&self, records: &[T]) -> Result<Vec<T>, CollectorError> {
            if self.fail { Err(down()) } else { Ok(records.to_vec()) }
        }
    }

    #[async_trait]
    impl DnsResolver for FakeDns {
        async fn resolve_a(&self, _host: &str) -> Result<Vec<String>, CollectorError> {
            self.answer(&self.a)
        }
        async fn resolve_cname(&self, _host: &str) -> Result<Vec<String>, CollectorError> {
            self.answer(&self.cname)
        }
        async fn reverse_lookup(&self, _ip: &str) -> Result<Vec<String>, CollectorError> {
            if self.reverse_fail {
                return Err(down());
            }
            self.answer(&self.ptr)
        }
        async fn enumerate_subdomains(&self, _domain: &str) -> Result<Vec<String>, CollectorError> {
            self.answer(&self.subdomains)
        }
    }

    struct FakeHttp(Option<HttpResponse>);

    #[async_trait]
    impl HttpClient for FakeHttp {
        async fn fetch(&self, _host: &str) -> Result<HttpResponse, CollectorError> {
            self.0.clone().ok_or_else(down)
        }
    }

    struct FakeTls(Option<TlsFindings>);

    #[async_trait]
    impl TlsClient for FakeTls {
        async fn fetch_certificate(&self, _host: &str) -> Result<TlsFindings, CollectorError> {
            self.0.clone().ok_or_else(down)
        }
    }

    #[derive(Default)]
    struct RecordingObserver(Mutex<Vec<ScanEvent>>);

    impl RecordingObserver {
        fn events(&self) -> Vec<ScanEvent> {
            self.0.lock().unwrap().clone()
        }

        fn started(&self) -> Vec<Phase> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    ScanEvent::Started(p) => Some(p),
                    _ => None,
                })
                .collect()
        }
    }

    impl ScanObserver for RecordingObserver {
        fn phase_started(&self, phase: Phase) {
            self.0.lock().unwrap().push(ScanEvent::Started(phase));
        }
        fn phase_skipped(&self, phase: Phase, reason: &str) {
            self.0.lock().unwrap().push(ScanEvent::Skipped { phase, reason: reason.to_string() });
        }
        fn phase_warning(&self, warning: &PhaseWarning) {
            self.0.lock().unwrap().push(ScanEvent::Warning(warning.clone()));
        }
    }

    fn response(headers: &[(&str, &str)], body: Option<&str>) -> HttpResponse {
        HttpResponse {
            status: 200,
            final_url: "https://example.com/".to_string(),
            headers: headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            body: body.map(str::to_string),
        }
    }

    fn certificate() -> TlsFindings {
        let now = Utc::now();
        TlsFindings {
            is_valid: true,
            certificate_info: CertificateInfo {
                subject_name: "CN=example.com".to_string(),
                issuer_name: "CN=Test CA".to_string(),
                common_name: Some("example.com".to_string()),
                san: vec!["example.com".to_string()],
                serial_number: "01".to_string(),
                not_before: now - chrono::Duration::days(10),
                not_after: now + chrono::Duration::days(80),
                days_until_expiry: 80,
                signature_algorithm: "sha256WithRSAEncryption".to_string(),
                public_key_algorithm: "RSA".to_string(),
                key_size: Some(2048),
            },
        }
    }

    fn orchestrator(
        dns: FakeDns,
        http: Option<HttpResponse>,
        tls: Option<TlsFindings>,
        observer: Arc<dyn ScanObserver>,
    ) -> Orchestrator {
        let collaborators = Collaborators {
            dns: Arc::new(dns),
            http: Arc::new(FakeHttp(http)),
            tls: Arc::new(FakeTls(tls)),
            geo: Arc::new(PassiveGeoLocator),
        };
        Orchestrator::new(collaborators, ScannerConfig::default(), observer)
    }

    fn healthy_dns() -> FakeDns {
        FakeDns {
            a: vec!["93.184.216.34".to_string()],
            subdomains: vec!["www.example.com".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn every_collaborator_failing_still_yields_a_result() {
        let dns = FakeDns { fail: true, ..Default::default() };
        let result = orchestrator(dns, None, None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(result.domain, "example.com");
        assert!(result.http.is_none());
        assert!(result.dns.is_none());
        assert!(result.tls.is_none());
        assert!(result.subdomains.is_empty());
        assert!(result.security_headers.is_empty());
        assert!(result.technologies.is_empty());
        assert!(result.cdn.is_none() && result.waf.is_none() && result.cloud_provider.is_none());
        assert!(result.geolocation.is_none());

        let failed: Vec<Phase> = result.warnings.iter().map(|w| w.phase).collect();
        assert_eq!(failed, vec![Phase::Http, Phase::Dns, Phase::Tls, Phase::Subdomains]);
    }

    #[tokio::test]
    async fn cloudflare_target_is_labelled() {
        let dns = FakeDns { cname: vec!["example.com.cdn.cloudflare.net".to_string()], ..healthy_dns() };
        let http = response(&[("Server", "cloudflare")], Some("<html></html>"));
        let result = orchestrator(dns, Some(http), None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(result.cdn.unwrap().name, "Cloudflare");
    }

    #[tokio::test]
    async fn missing_security_headers_give_an_empty_map() {
        let http = response(&[("content-type", "text/html")], Some("<html></html>"));
        let result = orchestrator(healthy_dns(), Some(http), None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert!(result.http.is_some());
        assert!(result.security_headers.is_empty());
    }

    #[tokio::test]
    async fn security_headers_keep_only_recognized_names() {
        let http = response(
            &[("Strict-Transport-Security", "max-age=31536000"), ("X-Powered-By", "PHP/8.2")],
            None,
        );
        let result = orchestrator(healthy_dns(), Some(http), None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(result.security_headers.len(), 1);
        assert_eq!(result.security_headers["strict-transport-security"], "max-age=31536000");
    }

    #[tokio::test]
    async fn no_a_records_skips_geolocation() {
        let observer = Arc::new(RecordingObserver::default());
        let dns = FakeDns { a: Vec::new(), ..healthy_dns() };
        let result = orchestrator(dns, None, None, observer.clone())
            .run_scan("example.com")
            .await
            .unwrap();

        assert!(result.dns.is_some());
        assert!(result.geolocation.is_none());
        assert!(result.cloud_provider.is_none());
        assert!(!observer.started().contains(&Phase::Geolocation));
        assert!(
            observer
                .events()
                .iter()
                .any(|e| matches!(e, ScanEvent::Skipped { phase: Phase::Geolocation, .. }))
        );
    }

    #[tokio::test]
    async fn subdomains_are_truncated_in_discovery_order() {
        let discovered: Vec<String> = (0..500).map(|i| format!("host{}.example.com", i)).collect();
        let dns = FakeDns { subdomains: discovered.clone(), ..healthy_dns() };
        let result = orchestrator(dns, None, None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(result.subdomains.len(), 50);
        assert_eq!(result.subdomains, discovered[..50]);
    }

    #[tokio::test]
    async fn http_failure_is_recorded_and_downstream_phases_skip() {
        let observer = Arc::new(RecordingObserver::default());
        let result = orchestrator(healthy_dns(), None, Some(certificate()), observer.clone())
            .run_scan("example.com")
            .await
            .unwrap();

        assert!(result.http.is_none());
        assert!(result.technologies.is_empty());
        assert!(result.security_headers.is_empty());
        assert!(result.phase_failed(Phase::Http));
        assert!(result.tls.is_some());
        assert!(result.dns.is_some());

        let started = observer.started();
        assert!(!started.contains(&Phase::Technology));
        assert!(!started.contains(&Phase::EdgeDetection));
    }

    #[tokio::test]
    async fn invalid_target_is_fatal() {
        let observer = Arc::new(RecordingObserver::default());
        let err = orchestrator(healthy_dns(), None, None, observer.clone())
            .run_scan("   ")
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::EmptyTarget));
        assert_eq!(observer.started(), vec![Phase::Identity]);
    }

    #[tokio::test]
    async fn phases_start_in_fixed_order() {
        let observer = Arc::new(RecordingObserver::default());
        let http = response(&[("server", "nginx")], Some("<html><body>hi</body></html>"));
        let dns = FakeDns { ptr: vec!["host.example.net.".to_string()], ..healthy_dns() };
        orchestrator(dns, Some(http), Some(certificate()), observer.clone())
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(observer.started(), Phase::iter().collect::<Vec<_>>());
        assert!(!observer.events().iter().any(|e| matches!(e, ScanEvent::Warning(_))));
    }

    #[tokio::test]
    async fn url_targets_are_normalized_before_any_phase() {
        let result = orchestrator(healthy_dns(), None, None, Arc::new(NullObserver))
            .run_scan("https://WWW.Example.com:8443/login?next=/")
            .await
            .unwrap();

        assert_eq!(result.domain, "www.example.com");
    }

    #[tokio::test]
    async fn cloud_provider_comes_from_reverse_hostname() {
        let dns = FakeDns {
            a: vec!["3.5.140.2".to_string()],
            ptr: vec!["ec2-3-5-140-2.eu-central-1.compute.amazonaws.com.".to_string()],
            ..Default::default()
        };
        let result = orchestrator(dns, None, None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(result.geolocation.as_ref().unwrap().ip, "3.5.140.2");
        assert_eq!(result.cloud_provider.unwrap().name, "Amazon Web Services");
    }

    #[tokio::test]
    async fn technologies_come_from_the_response_body() {
        let body = r#"<html><head><meta name="generator" content="WordPress 6.4.2"></head>
            <body><script src="/wp-content/themes/x/app.js"></script></body></html>"#;
        let http = response(&[("server", "nginx/1.25.3")], Some(body));
        let result = orchestrator(healthy_dns(), Some(http), None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert!(result.technologies.iter().any(|t| t.name == "WordPress"));
    }

    #[tokio::test]
    async fn consecutive_scans_do_not_share_state() {
        let dns = FakeDns { fail: true, ..Default::default() };
        let orchestrator = orchestrator(dns, None, None, Arc::new(NullObserver));

        let first = orchestrator.run_scan("first.example").await.unwrap();
        let second = orchestrator.run_scan("second.example").await.unwrap();

        assert_eq!(first.domain, "first.example");
        assert_eq!(second.domain, "second.example");
        assert_eq!(first.warnings.len(), second.warnings.len());
    }

    #[tokio::test]
    async fn cookie_signals_survive_repeated_set_cookie_headers() {
        let http = response(
            &[
                ("Set-Cookie", "visid_incap_2231=Zm9v; path=/"),
                ("Set-Cookie", "laravel_session=abc; httponly"),
                ("Set-Cookie", "lang=en; path=/"),
            ],
            Some("<html></html>"),
        );
        let result = orchestrator(healthy_dns(), Some(http), None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        let http = result.http.as_ref().unwrap();
        assert_eq!(http.headers["set-cookie"], "lang=en; path=/");
        assert_eq!(http.cookies.len(), 3);
        assert_eq!(result.waf.as_ref().unwrap().name, "Imperva Incapsula");
        assert!(result.technologies.iter().any(|t| t.name == "Laravel"));
    }

    #[tokio::test]
    async fn reverse_lookup_failure_keeps_geolocation() {
        let dns = FakeDns { a: vec!["1.2.3.4".to_string()], reverse_fail: true, ..Default::default() };
        let result = orchestrator(dns, None, None, Arc::new(NullObserver))
            .run_scan("example.com")
            .await
            .unwrap();

        assert_eq!(result.geolocation.as_ref().unwrap().ip, "1.2.3.4");
        assert!(result.cloud_provider.is_none());
        assert!(result.phase_failed(Phase::Geolocation));
        assert!(result.dns.is_some());
    }

    #[tokio::test]
    async fn dns_failure_skips_edge_detection() {
        let observer = Arc::new(RecordingObserver::default());
        let dns = FakeDns { fail: true, ..Default::default() };
        let http = response(&[("cf-ray", "8a1b2c3d4e5f-FRA"), ("server", "cloudflare")], Some("<html></html>"));
        let result = orchestrator(dns, Some(http), None, observer.clone())
            .run_scan("example.com")
            .await
            .unwrap();

        assert!(result.http.is_some());
        assert!(result.dns.is_none());
        assert!(result.phase_failed(Phase::Dns));
        assert!(result.cdn.is_none() && result.waf.is_none());
        assert!(!observer.started().contains(&Phase::EdgeDetection));
        assert!(
            observer
                .events()
                .iter()
                .any(|e| matches!(e, ScanEvent::Skipped { phase: Phase::EdgeDetection, .. }))
        );
    }

    #[tokio::test]
    async fn fatal_collector_phase_aborts_with_its_name() {
        const STRICT: &[PhaseSpec] = &[
            spec(Phase::Identity, &[], true),
            spec(Phase::Http, &[Phase::Identity], true),
            spec(Phase::Dns, &[Phase::Identity], false),
        ];
        let observer = Arc::new(RecordingObserver::default());
        let err = orchestrator(healthy_dns(), None, None, observer.clone())
            .run_pipeline(STRICT, "example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::PhaseFailed { phase: Phase::Http, .. }));
        assert_eq!(observer.started(), vec![Phase::Identity, Phase::Http]);
    }
}
