// src/core/fingerprint/mod.rs

//! Rule-based classification of raw signals into labeled findings.
//!
//! Single-label taxonomies (CDN, WAF, cloud provider) share [`RuleTable`]: an
//! immutable list of `{priority, matcher, label}` rules, sorted once when the
//! table is built. The first matching rule wins, so the outcome never depends
//! on the order the rules were written in. Technology detection is multi-label
//! and lives in [`technology`].

pub mod cdn;
pub mod cloud;
pub mod technology;
pub mod waf;

use std::collections::BTreeMap;

use crate::core::models::{EvidenceSource, Label};

/// Priority bands. Lower values are checked first.
pub const HEADER_PRIORITY: u16 = 0;
pub const CNAME_PRIORITY: u16 = 100;
pub const BODY_PRIORITY: u16 = 200;

/// What a rule looks at. All needles are lower-case and matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Matcher {
    /// The named header is present, whatever its value.
    HeaderPresent(&'static str),
    /// The named header's value contains the needle.
    HeaderContains(&'static str, &'static str),
    /// Any `Set-Cookie` value contains the needle.
    CookieContains(&'static str),
    /// Any entry of the CNAME chain contains the needle.
    CnameContains(&'static str),
    /// The response body contains the needle.
    BodyContains(&'static str),
    /// The reverse-resolved hostname contains the needle.
    HostnameContains(&'static str),
    /// The ISP string contains the needle.
    IspContains(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub priority: u16,
    pub matcher: Matcher,
    pub label: &'static str,
}

impl Rule {
    pub const fn new(priority: u16, matcher: Matcher, label: &'static str) -> Self {
        Self { priority, matcher, label }
    }
}

/// Raw inputs available to the engine. Missing sources simply never match.
#[derive(Debug, Default, Clone, Copy)]
pub struct Signals<'a> {
    pub headers: Option<&'a BTreeMap<String, String>>,
    pub cookies: &'a [String],
    pub cname: &'a [String],
    pub body: Option<&'a str>,
    pub hostname: Option<&'a str>,
    pub isp: Option<&'a str>,
}

/// Lower-cased view of [`Signals`], built once per detection call.
struct Prepared<'a> {
    headers: Option<&'a BTreeMap<String, String>>,
    cookies: Vec<String>,
    cname: Vec<(String, &'a str)>,
    body: Option<String>,
    hostname: Option<String>,
    isp: Option<String>,
}

impl<'a> Prepared<'a> {
    fn new(signals: &Signals<'a>) -> Self {
        Self {
            headers: signals.headers,
            cookies: signals.cookies.iter().map(|c| c.to_ascii_lowercase()).collect(),
            cname: signals.cname.iter().map(|c| (c.to_ascii_lowercase(), c.as_str())).collect(),
            body: signals.body.map(str::to_ascii_lowercase),
            hostname: signals.hostname.map(str::to_ascii_lowercase),
            isp: signals.isp.map(str::to_ascii_lowercase),
        }
    }

    fn header(&self, name: &str) -> Option<&'a String> {
        self.headers.and_then(|h| h.get(name))
    }

    /// Returns the evidence source and literal evidence when the matcher fires.
    fn evaluate(&self, matcher: &Matcher) -> Option<(EvidenceSource, String)> {
        match *matcher {
            Matcher::HeaderPresent(name) => self
                .header(name)
                .map(|value| (EvidenceSource::Header, format!("{}: {}", name, value))),
            Matcher::HeaderContains(name, needle) => self
                .header(name)
                .filter(|value| value.to_ascii_lowercase().contains(needle))
                .map(|value| (EvidenceSource::Header, format!("{}: {}", name, value))),
            Matcher::CookieContains(needle) => self
                .cookies
                .iter()
                .any(|cookie| cookie.contains(needle))
                .then(|| (EvidenceSource::Cookie, needle.to_string())),
            Matcher::CnameContains(needle) => self
                .cname
                .iter()
                .find(|(lower, _)| lower.contains(needle))
                .map(|(_, original)| (EvidenceSource::Cname, original.to_string())),
            Matcher::BodyContains(needle) => self
                .body
                .as_deref()
                .filter(|body| body.contains(needle))
                .map(|_| (EvidenceSource::Body, needle.to_string())),
            Matcher::HostnameContains(needle) => self
                .hostname
                .as_deref()
                .filter(|host| host.contains(needle))
                .map(|host| (EvidenceSource::Hostname, host.to_string())),
            Matcher::IspContains(needle) => self
                .isp
                .as_deref()
                .filter(|isp| isp.contains(needle))
                .map(|_| (EvidenceSource::Isp, needle.to_string())),
        }
    }
}

/// An immutable, priority-sorted rule table for a single-label taxonomy.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Sorts by priority, then label, then matcher, so equal priorities still
    /// resolve the same way whatever order `rules` arrives in.
    pub fn new(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.label.cmp(b.label))
                .then_with(|| a.matcher.cmp(&b.matcher))
        });
        Self { rules }
    }

    /// Label of the highest-priority matching rule, or `None` when nothing matches.
    pub fn first_match(&self, signals: &Signals<'_>) -> Option<Label> {
        let prepared = Prepared::new(signals);
        self.rules.iter().find_map(|rule| {
            prepared.evaluate(&rule.matcher).map(|(source, evidence)| Label {
                name: rule.label.to_string(),
                source,
                evidence,
            })
        })
    }
}
