// src/core/fingerprint/cdn.rs

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{CNAME_PRIORITY, HEADER_PRIORITY, Matcher, Rule, RuleTable, Signals};
use crate::core::models::Label;

/// CDN rules. Vendor-specific header keys come first, then `server`/`via`
/// values, then CNAME suffixes.
pub static CDN_RULES: Lazy<RuleTable> = Lazy::new(|| {
    use Matcher::*;
    RuleTable::new(vec![
        // Vendor-specific headers.
        Rule::new(HEADER_PRIORITY, HeaderPresent("cf-ray"), "Cloudflare"),
        Rule::new(HEADER_PRIORITY + 1, HeaderPresent("x-amz-cf-id"), "Amazon CloudFront"),
        Rule::new(HEADER_PRIORITY + 2, HeaderPresent("x-fastly-request-id"), "Fastly"),
        Rule::new(HEADER_PRIORITY + 3, HeaderPresent("x-akamai-transformed"), "Akamai"),
        Rule::new(HEADER_PRIORITY + 4, HeaderPresent("x-azure-ref"), "Azure Front Door"),
        Rule::new(HEADER_PRIORITY + 5, HeaderPresent("x-msedge-ref"), "Azure CDN"),
        Rule::new(HEADER_PRIORITY + 6, HeaderPresent("x-vercel-id"), "Vercel"),
        Rule::new(HEADER_PRIORITY + 7, HeaderPresent("x-nf-request-id"), "Netlify"),
        Rule::new(HEADER_PRIORITY + 8, HeaderPresent("x-sucuri-id"), "Sucuri"),
        Rule::new(HEADER_PRIORITY + 9, HeaderPresent("x-iinfo"), "Imperva Incapsula"),
        Rule::new(HEADER_PRIORITY + 10, HeaderPresent("x-hw"), "StackPath"),
        Rule::new(HEADER_PRIORITY + 11, HeaderPresent("cdn-pullzone"), "BunnyCDN"),
        // Generic header values.
        Rule::new(HEADER_PRIORITY + 20, HeaderContains("server", "cloudflare"), "Cloudflare"),
        Rule::new(HEADER_PRIORITY + 21, HeaderContains("server", "cloudfront"), "Amazon CloudFront"),
        Rule::new(HEADER_PRIORITY + 22, HeaderContains("via", "cloudfront"), "Amazon CloudFront"),
        Rule::new(HEADER_PRIORITY + 23, HeaderContains("server", "akamaighost"), "Akamai"),
        Rule::new(HEADER_PRIORITY + 24, HeaderContains("x-served-by", "cache-"), "Fastly"),
        Rule::new(HEADER_PRIORITY + 25, HeaderContains("via", "varnish"), "Varnish"),
        Rule::new(HEADER_PRIORITY + 26, HeaderContains("server", "bunnycdn"), "BunnyCDN"),
        Rule::new(HEADER_PRIORITY + 27, HeaderContains("server", "keycdn"), "KeyCDN"),
        Rule::new(HEADER_PRIORITY + 28, HeaderContains("server", "netlify"), "Netlify"),
        Rule::new(HEADER_PRIORITY + 29, HeaderContains("server", "vercel"), "Vercel"),
        Rule::new(HEADER_PRIORITY + 30, HeaderContains("server", "gws"), "Google Cloud CDN"),
        Rule::new(HEADER_PRIORITY + 31, HeaderContains("via", "google"), "Google Cloud CDN"),
        // CNAME chain.
        Rule::new(CNAME_PRIORITY, CnameContains("cloudflare.net"), "Cloudflare"),
        Rule::new(CNAME_PRIORITY + 1, CnameContains("cloudfront.net"), "Amazon CloudFront"),
        Rule::new(CNAME_PRIORITY + 2, CnameContains("fastly.net"), "Fastly"),
        Rule::new(CNAME_PRIORITY + 3, CnameContains("fastlylb.net"), "Fastly"),
        Rule::new(CNAME_PRIORITY + 4, CnameContains("akamaiedge.net"), "Akamai"),
        Rule::new(CNAME_PRIORITY + 5, CnameContains("akamaized.net"), "Akamai"),
        Rule::new(CNAME_PRIORITY + 6, CnameContains("edgekey.net"), "Akamai"),
        Rule::new(CNAME_PRIORITY + 7, CnameContains("edgesuite.net"), "Akamai"),
        Rule::new(CNAME_PRIORITY + 8, CnameContains("azurefd.net"), "Azure Front Door"),
        Rule::new(CNAME_PRIORITY + 9, CnameContains("azureedge.net"), "Azure CDN"),
        Rule::new(CNAME_PRIORITY + 10, CnameContains("vercel-dns.com"), "Vercel"),
        Rule::new(CNAME_PRIORITY + 11, CnameContains("netlify.app"), "Netlify"),
        Rule::new(CNAME_PRIORITY + 12, CnameContains("incapdns.net"), "Imperva Incapsula"),
        Rule::new(CNAME_PRIORITY + 13, CnameContains("stackpathdns.com"), "StackPath"),
        Rule::new(CNAME_PRIORITY + 14, CnameContains("b-cdn.net"), "BunnyCDN"),
        Rule::new(CNAME_PRIORITY + 15, CnameContains("kxcdn.com"), "KeyCDN"),
        Rule::new(CNAME_PRIORITY + 16, CnameContains("cdn77.org"), "CDN77"),
        Rule::new(CNAME_PRIORITY + 17, CnameContains("googlehosted.com"), "Google Cloud CDN"),
    ])
});

/// Identifies the CDN in front of the target from response headers and the CNAME chain.
pub fn detect_cdn(headers: &BTreeMap<String, String>, cname_chain: &[String]) -> Option<Label> {
    let signals = Signals { headers: Some(headers), cname: cname_chain, ..Default::default() };
    let label = CDN_RULES.first_match(&signals);
    debug!(cdn = ?label.as_ref().map(|l| l.name.as_str()), "CDN detection finished.");
    label
}
