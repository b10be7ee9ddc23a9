// src/core/fingerprint/waf.rs

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use tracing::debug;

use super::{BODY_PRIORITY, HEADER_PRIORITY, Matcher, Rule, RuleTable, Signals};
use crate::core::models::Label;

/// WAF rules. Headers and cookies decide first; block/challenge page text is
/// only consulted when no header rule matches.
pub static WAF_RULES: Lazy<RuleTable> = Lazy::new(|| {
    use Matcher::*;
    RuleTable::new(vec![
        Rule::new(HEADER_PRIORITY, HeaderPresent("cf-ray"), "Cloudflare"),
        Rule::new(HEADER_PRIORITY + 1, HeaderContains("server", "cloudflare"), "Cloudflare"),
        Rule::new(HEADER_PRIORITY + 2, CookieContains("__cf_bm"), "Cloudflare"),
        Rule::new(HEADER_PRIORITY + 3, HeaderPresent("x-amzn-waf-action"), "AWS WAF"),
        Rule::new(HEADER_PRIORITY + 4, CookieContains("aws-waf-token"), "AWS WAF"),
        Rule::new(HEADER_PRIORITY + 5, HeaderPresent("x-iinfo"), "Imperva Incapsula"),
        Rule::new(HEADER_PRIORITY + 6, HeaderContains("x-cdn", "incapsula"), "Imperva Incapsula"),
        Rule::new(HEADER_PRIORITY + 7, CookieContains("incap_ses"), "Imperva Incapsula"),
        Rule::new(HEADER_PRIORITY + 8, CookieContains("visid_incap"), "Imperva Incapsula"),
        Rule::new(HEADER_PRIORITY + 9, HeaderContains("server", "akamaighost"), "Akamai Kona Site Defender"),
        Rule::new(HEADER_PRIORITY + 10, HeaderPresent("akamai-grn"), "Akamai Kona Site Defender"),
        Rule::new(HEADER_PRIORITY + 11, HeaderPresent("x-sucuri-id"), "Sucuri CloudProxy"),
        Rule::new(HEADER_PRIORITY + 12, HeaderContains("server", "sucuri"), "Sucuri CloudProxy"),
        Rule::new(HEADER_PRIORITY + 13, HeaderContains("server", "bigip"), "F5 BIG-IP ASM"),
        Rule::new(HEADER_PRIORITY + 14, CookieContains("bigipserver"), "F5 BIG-IP ASM"),
        Rule::new(HEADER_PRIORITY + 15, HeaderPresent("x-wa-info"), "F5 BIG-IP ASM"),
        Rule::new(HEADER_PRIORITY + 16, CookieContains("barra_counter_session"), "Barracuda"),
        Rule::new(HEADER_PRIORITY + 17, CookieContains("fortiwafsid"), "FortiWeb"),
        Rule::new(HEADER_PRIORITY + 18, HeaderContains("server", "mod_security"), "ModSecurity"),
        Rule::new(HEADER_PRIORITY + 19, HeaderContains("server", "noyb"), "ModSecurity"),
        Rule::new(HEADER_PRIORITY + 20, HeaderPresent("x-datadome"), "DataDome"),
        Rule::new(HEADER_PRIORITY + 21, HeaderContains("server", "ddos-guard"), "DDoS-Guard"),
        Rule::new(HEADER_PRIORITY + 22, HeaderContains("x-powered-by", "wp engine"), "WP Engine"),
        // Challenge and block pages.
        Rule::new(BODY_PRIORITY, BodyContains("attention required! | cloudflare"), "Cloudflare"),
        Rule::new(BODY_PRIORITY + 1, BodyContains("cf-browser-verification"), "Cloudflare"),
        Rule::new(BODY_PRIORITY + 2, BodyContains("request unsuccessful. incapsula incident id"), "Imperva Incapsula"),
        Rule::new(BODY_PRIORITY + 3, BodyContains("generated by wordfence"), "Wordfence"),
        Rule::new(BODY_PRIORITY + 4, BodyContains("sucuri website firewall"), "Sucuri CloudProxy"),
        Rule::new(BODY_PRIORITY + 5, BodyContains("the requested url was rejected. please consult with your administrator"), "F5 BIG-IP ASM"),
        Rule::new(BODY_PRIORITY + 6, BodyContains("this error was generated by mod_security"), "ModSecurity"),
    ])
});

/// Identifies a WAF from response headers, every `Set-Cookie` value and, optionally, the response body.
pub fn detect_waf(headers: &BTreeMap<String, String>, cookies: &[String], body: Option<&str>) -> Option<Label> {
    let signals = Signals { headers: Some(headers), cookies, body, ..Default::default() };
    let label = WAF_RULES.first_match(&signals);
    debug!(waf = ?label.as_ref().map(|l| l.name.as_str()), "WAF detection finished.");
    label
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::EvidenceSource;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn detects_from_headers_alone() {
        let h = headers(&[("x-iinfo", "10-123-0 0NNN RT(1 2)")]);
        let label = detect_waf(&h, &[], None).unwrap();
        assert_eq!(label.name, "Imperva Incapsula");
        assert_eq!(label.source, EvidenceSource::Header);
    }

    #[test]
    fn detects_from_cookie() {
        let cookies = vec!["BIGipServerpool_web=123456.20480.0000; path=/".to_string()];
        assert_eq!(detect_waf(&BTreeMap::new(), &cookies, None).unwrap().name, "F5 BIG-IP ASM");
    }

    #[test]
    fn signal_cookie_need_not_be_the_last_one() {
        let cookies = vec![
            "visid_incap_2231=Zm9v; path=/".to_string(),
            "laravel_session=abc; httponly".to_string(),
            "lang=en; path=/".to_string(),
        ];
        let h = headers(&[("set-cookie", "lang=en; path=/")]);
        let label = detect_waf(&h, &cookies, None).unwrap();
        assert_eq!(label.name, "Imperva Incapsula");
        assert_eq!(label.source, EvidenceSource::Cookie);
    }

    #[test]
    fn header_rules_beat_body_rules() {
        let h = headers(&[("x-sucuri-id", "11005")]);
        let body = "<title>Attention Required! | Cloudflare</title>";
        assert_eq!(detect_waf(&h, &[], Some(body)).unwrap().name, "Sucuri CloudProxy");
    }

    #[test]
    fn body_is_an_optional_second_source() {
        let h = headers(&[("server", "nginx")]);
        let body = "<p>Generated by Wordfence at Mon, 1 Jan 2024</p>";
        assert_eq!(detect_waf(&h, &[], None), None);
        let label = detect_waf(&h, &[], Some(body)).unwrap();
        assert_eq!(label.name, "Wordfence");
        assert_eq!(label.source, EvidenceSource::Body);
    }

    #[test]
    fn no_waf_is_absent_and_stable() {
        let h = headers(&[("server", "Apache/2.4.57")]);
        assert_eq!(detect_waf(&h, &[], Some("<html></html>")), None);
        assert_eq!(detect_waf(&h, &[], None), detect_waf(&h, &[], None));
    }
}
