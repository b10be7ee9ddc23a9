// src/core/fingerprint/technology.rs

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::core::models::{EvidenceSource, Technology};

/// Defines the different places a technology signature can be found.
enum Check<'a> {
    /// A pattern in a specific HTTP header.
    Header(&'a str, &'a Lazy<Regex>),
    /// A pattern in the content of a specific meta tag.
    MetaTag(&'a str, &'a Lazy<Regex>),
    /// A pattern anywhere in the HTML body.
    Body(&'a Lazy<Regex>),
    /// A pattern in the `src` attribute of `<script>` tags.
    ScriptSrc(&'a Lazy<Regex>),
    /// A pattern in the `href` attribute of `<link>` tags.
    LinkHref(&'a Lazy<Regex>),
    /// A pattern in any `Set-Cookie` value.
    Cookie(&'a Lazy<Regex>),
}

impl Check<'_> {
    fn source(&self) -> EvidenceSource {
        match self {
            Check::Header(..) => EvidenceSource::Header,
            Check::MetaTag(..) => EvidenceSource::MetaTag,
            Check::Body(_) => EvidenceSource::Body,
            Check::ScriptSrc(_) => EvidenceSource::ScriptSrc,
            Check::LinkHref(_) => EvidenceSource::LinkHref,
            Check::Cookie(_) => EvidenceSource::Cookie,
        }
    }
}

/// A rule that defines how to detect a specific technology.
struct FingerprintRule<'a> {
    tech_name: &'a str,
    category: &'a str,
    check: Check<'a>,
}

/// A successful check: the matched text and, when the pattern captures one, a version.
struct RuleMatch {
    evidence: String,
    version: Option<String>,
}

// Version-bearing patterns put the version in capture group 1.
static RE_NGINX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)nginx(?:/([\d\.]+))?").unwrap());
static RE_NGINX_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<hr><center>nginx</center>").unwrap());
static RE_APACHE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Apache(?:/([\d\.]+))?").unwrap());
static RE_APACHE_ERROR: Lazy<Regex> = Lazy::new(|| Regex::new(r"Apache Server at").unwrap());
static RE_IIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Microsoft-IIS/([\d\.]+)").unwrap());
static RE_LITESPEED: Lazy<Regex> = Lazy::new(|| Regex::new(r"LiteSpeed").unwrap());
static RE_CADDY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^caddy").unwrap());
static RE_OPENRESTY: Lazy<Regex> = Lazy::new(|| Regex::new(r"openresty(?:/([\d\.]+))?").unwrap());
static RE_WORDPRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"WordPress ?([\d\.]+)?").unwrap());
static RE_WP_EMBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"/wp-content/|/wp-includes/").unwrap());
static RE_WP_LOGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"wp-login\.php").unwrap());
static RE_JOOMLA: Lazy<Regex> = Lazy::new(|| Regex::new(r"Joomla!").unwrap());
static RE_DRUPAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"Drupal ?([\d\.]+)?").unwrap());
static RE_DRUPAL_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Drupal").unwrap());
static RE_GHOST: Lazy<Regex> = Lazy::new(|| Regex::new(r"Ghost ?([\d\.]+)?").unwrap());
static RE_WIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"Wix\.com").unwrap());
static RE_SQUARESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)static\.squarespace\.com").unwrap());
static RE_SHOPIFY: Lazy<Regex> = Lazy::new(|| Regex::new(r".+").unwrap());
static RE_SHOPIFY_CDN: Lazy<Regex> = Lazy::new(|| Regex::new(r"cdn\.shopify\.com").unwrap());
static RE_MAGENTO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)mage-cache|magento").unwrap());
static RE_PRESTASHOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"PrestaShop").unwrap());
static RE_PHP: Lazy<Regex> = Lazy::new(|| Regex::new(r"PHP/([\d\.]+)").unwrap());
static RE_PHPSESSID: Lazy<Regex> = Lazy::new(|| Regex::new(r"PHPSESSID").unwrap());
static RE_ASPNET: Lazy<Regex> = Lazy::new(|| Regex::new(r"ASP\.NET").unwrap());
static RE_ASPNET_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d\.]+)").unwrap());
static RE_JSESSIONID: Lazy<Regex> = Lazy::new(|| Regex::new(r"JSESSIONID").unwrap());
static RE_EXPRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Express$").unwrap());
static RE_DJANGO_CSRF: Lazy<Regex> = Lazy::new(|| Regex::new(r"csrftoken").unwrap());
static RE_LARAVEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"laravel_session").unwrap());
static RE_RUBY_RAILS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_rails_session|_session_id").unwrap());
static RE_NEXTJS: Lazy<Regex> = Lazy::new(|| Regex::new(r"Next\.js ?([\d\.]+)?").unwrap());
static RE_NEXTJS_SCRIPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/_next/static/").unwrap());
static RE_NUXTJS: Lazy<Regex> = Lazy::new(|| Regex::new(r"__NUXT__").unwrap());
static RE_ANGULAR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"ng-version="([\d\.]+)""#).unwrap());
static RE_SVELTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"class=["']svelte-"#).unwrap());
static RE_GATSBY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"id=["']___gatsby["']"#).unwrap());
static RE_ASTRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"Astro v([\d\.]+)").unwrap());
static RE_JQUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"jquery(?:[-.]([\d]+\.[\d\.]+))?(?:\.min|\.slim)?\.js").unwrap());
static RE_REACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"react-dom|data-reactroot|react\.development").unwrap());
static RE_VUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"data-v-app|__VUE_").unwrap());
static RE_BOOTSTRAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"bootstrap(?:@([\d\.]+))?.*\.css").unwrap());
static RE_TAILWIND: Lazy<Regex> = Lazy::new(|| Regex::new(r"tailwind(?:css)?").unwrap());
static RE_GOOGLE_ANALYTICS: Lazy<Regex> = Lazy::new(|| Regex::new(r"google-analytics\.com/|googletagmanager\.com/").unwrap());
static RE_CLOUDFLARE_INSIGHTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"static\.cloudflareinsights\.com").unwrap());
static RE_RECAPTCHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"google\.com/recaptcha|recaptcha/api\.js").unwrap());

/// The master list of technology rules. A technology may appear several times;
/// the first matching rule supplies the evidence, a later one may still add a version.
static RULES: &[FingerprintRule] = &[
    FingerprintRule { tech_name: "Nginx", category: "Web Server", check: Check::Header("server", &RE_NGINX) },
    FingerprintRule { tech_name: "Nginx", category: "Web Server", check: Check::Body(&RE_NGINX_ERROR) },
    FingerprintRule { tech_name: "Apache", category: "Web Server", check: Check::Header("server", &RE_APACHE) },
    FingerprintRule { tech_name: "Apache", category: "Web Server", check: Check::Body(&RE_APACHE_ERROR) },
    FingerprintRule { tech_name: "Microsoft IIS", category: "Web Server", check: Check::Header("server", &RE_IIS) },
    FingerprintRule { tech_name: "LiteSpeed", category: "Web Server", check: Check::Header("server", &RE_LITESPEED) },
    FingerprintRule { tech_name: "Caddy", category: "Web Server", check: Check::Header("server", &RE_CADDY) },
    FingerprintRule { tech_name: "OpenResty", category: "Web Server", check: Check::Header("server", &RE_OPENRESTY) },
    FingerprintRule { tech_name: "WordPress", category: "CMS", check: Check::MetaTag("generator", &RE_WORDPRESS) },
    FingerprintRule { tech_name: "WordPress", category: "CMS", check: Check::Body(&RE_WP_EMBED) },
    FingerprintRule { tech_name: "WordPress", category: "CMS", check: Check::Body(&RE_WP_LOGIN) },
    FingerprintRule { tech_name: "Joomla", category: "CMS", check: Check::MetaTag("generator", &RE_JOOMLA) },
    FingerprintRule { tech_name: "Drupal", category: "CMS", check: Check::MetaTag("generator", &RE_DRUPAL) },
    FingerprintRule { tech_name: "Drupal", category: "CMS", check: Check::Header("x-generator", &RE_DRUPAL_HEADER) },
    FingerprintRule { tech_name: "Ghost", category: "CMS", check: Check::MetaTag("generator", &RE_GHOST) },
    FingerprintRule { tech_name: "Wix", category: "Website Builder", check: Check::MetaTag("generator", &RE_WIX) },
    FingerprintRule { tech_name: "Squarespace", category: "Website Builder", check: Check::Body(&RE_SQUARESPACE) },
    FingerprintRule { tech_name: "Shopify", category: "E-commerce", check: Check::Header("x-shopid", &RE_SHOPIFY) },
    FingerprintRule { tech_name: "Shopify", category: "E-commerce", check: Check::ScriptSrc(&RE_SHOPIFY_CDN) },
    FingerprintRule { tech_name: "Magento", category: "E-commerce", check: Check::Cookie(&RE_MAGENTO) },
    FingerprintRule { tech_name: "PrestaShop", category: "E-commerce", check: Check::Header("powered-by", &RE_PRESTASHOP) },
    FingerprintRule { tech_name: "PHP", category: "Language", check: Check::Header("x-powered-by", &RE_PHP) },
    FingerprintRule { tech_name: "PHP", category: "Language", check: Check::Cookie(&RE_PHPSESSID) },
    FingerprintRule { tech_name: "ASP.NET", category: "Framework", check: Check::Header("x-powered-by", &RE_ASPNET) },
    FingerprintRule { tech_name: "ASP.NET", category: "Framework", check: Check::Header("x-aspnet-version", &RE_ASPNET_VERSION) },
    FingerprintRule { tech_name: "Java", category: "Language", check: Check::Cookie(&RE_JSESSIONID) },
    FingerprintRule { tech_name: "Express", category: "Framework", check: Check::Header("x-powered-by", &RE_EXPRESS) },
    FingerprintRule { tech_name: "Django", category: "Framework", check: Check::Cookie(&RE_DJANGO_CSRF) },
    FingerprintRule { tech_name: "Laravel", category: "Framework", check: Check::Cookie(&RE_LARAVEL) },
    FingerprintRule { tech_name: "Ruby on Rails", category: "Framework", check: Check::Cookie(&RE_RUBY_RAILS) },
    FingerprintRule { tech_name: "Next.js", category: "JS Framework", check: Check::Header("x-powered-by", &RE_NEXTJS) },
    FingerprintRule { tech_name: "Next.js", category: "JS Framework", check: Check::ScriptSrc(&RE_NEXTJS_SCRIPT) },
    FingerprintRule { tech_name: "Nuxt.js", category: "JS Framework", check: Check::Body(&RE_NUXTJS) },
    FingerprintRule { tech_name: "Angular", category: "JS Framework", check: Check::Body(&RE_ANGULAR) },
    FingerprintRule { tech_name: "Svelte", category: "JS Framework", check: Check::Body(&RE_SVELTE) },
    FingerprintRule { tech_name: "Gatsby", category: "JS Framework", check: Check::Body(&RE_GATSBY) },
    FingerprintRule { tech_name: "Astro", category: "JS Framework", check: Check::MetaTag("generator", &RE_ASTRO) },
    FingerprintRule { tech_name: "React", category: "JS Library", check: Check::Body(&RE_REACT) },
    FingerprintRule { tech_name: "Vue.js", category: "JS Library", check: Check::Body(&RE_VUE) },
    FingerprintRule { tech_name: "jQuery", category: "JS Library", check: Check::ScriptSrc(&RE_JQUERY) },
    FingerprintRule { tech_name: "Bootstrap", category: "UI Framework", check: Check::LinkHref(&RE_BOOTSTRAP) },
    FingerprintRule { tech_name: "Tailwind CSS", category: "UI Framework", check: Check::LinkHref(&RE_TAILWIND) },
    FingerprintRule { tech_name: "Google Analytics", category: "Analytics", check: Check::ScriptSrc(&RE_GOOGLE_ANALYTICS) },
    FingerprintRule { tech_name: "Cloudflare Web Analytics", category: "Analytics", check: Check::ScriptSrc(&RE_CLOUDFLARE_INSIGHTS) },
    FingerprintRule { tech_name: "reCAPTCHA", category: "Security", check: Check::ScriptSrc(&RE_RECAPTCHA) },
];

/// Identifies the technologies used by a page from its body, response headers and cookies.
///
/// Several technologies can match at once. The result is ordered by name so
/// identical input always yields identical output.
pub fn detect_technologies(body: &str, headers: &BTreeMap<String, String>, cookies: &[String]) -> Vec<Technology> {
    let document = Html::parse_document(body);

    let mut found_techs: BTreeMap<String, Technology> = BTreeMap::new();

    debug!(total_rules = %RULES.len(), "Applying technology rules.");
    for rule in RULES {
        let matched = match &rule.check {
            Check::Header(name, re) => check_with_regex(headers.get(*name).map(String::as_str), re),
            Check::MetaTag(name, re) => check_meta_tag(&document, name, re),
            Check::Body(re) => check_with_regex(Some(body), re),
            Check::ScriptSrc(re) => check_attribute(&document, "script[src]", "src", re),
            Check::LinkHref(re) => check_attribute(&document, "link[href]", "href", re),
            Check::Cookie(re) => cookies.iter().find_map(|cookie| check_with_regex(Some(cookie), re)),
        };

        let Some(m) = matched else { continue };
        debug!(tech = %rule.tech_name, version = ?m.version, "Rule matched.");

        match found_techs.get_mut(rule.tech_name) {
            Some(existing) => {
                if existing.version.is_none() && m.version.is_some() {
                    existing.version = m.version;
                }
            }
            None => {
                found_techs.insert(
                    rule.tech_name.to_string(),
                    Technology {
                        name: rule.tech_name.to_string(),
                        category: rule.category.to_string(),
                        version: m.version,
                        source: rule.check.source(),
                        evidence: m.evidence,
                    },
                );
            }
        }
    }

    debug!(count = %found_techs.len(), "Technology detection finished.");
    found_techs.into_values().collect()
}

/// Applies a regex to an optional string slice. Capture group 1, when present
/// and non-empty, is taken as the version.
fn check_with_regex(text: Option<&str>, re: &Regex) -> Option<RuleMatch> {
    let caps = re.captures(text?)?;
    let evidence = caps.get(0)?.as_str().to_string();
    let version = caps
        .get(1)
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|s| !s.is_empty());
    Some(RuleMatch { evidence, version })
}

fn check_meta_tag(doc: &Html, name: &str, re: &Regex) -> Option<RuleMatch> {
    let selector = Selector::parse(&format!("meta[name='{}']", name)).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .find_map(|content| check_with_regex(Some(content), re))
}

fn check_attribute(doc: &Html, selector: &str, attr: &str, re: &Regex) -> Option<RuleMatch> {
    let selector = Selector::parse(selector).ok()?;
    doc.select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .find_map(|value| check_with_regex(Some(value), re))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn names(techs: &[Technology]) -> Vec<&str> {
        techs.iter().map(|t| t.name.as_str()).collect()
    }

    const WORDPRESS_PAGE: &str = r#"<html><head>
        <meta name="generator" content="WordPress 6.4.2">
        <link rel="stylesheet" href="/wp-content/themes/x/bootstrap.min.css">
        <script src="/wp-includes/js/jquery/jquery.min.js"></script>
        <script src="https://www.googletagmanager.com/gtag/js?id=G-1"></script>
        </head><body></body></html>"#;

    #[test]
    fn detects_several_technologies_at_once() {
        let h = headers(&[("server", "nginx/1.25.3"), ("x-powered-by", "PHP/8.2.12")]);
        let techs = detect_technologies(WORDPRESS_PAGE, &h, &[]);

        let found = names(&techs);
        for expected in ["Nginx", "PHP", "WordPress", "jQuery", "Bootstrap", "Google Analytics"] {
            assert!(found.contains(&expected), "missing {expected} in {found:?}");
        }

        let nginx = techs.iter().find(|t| t.name == "Nginx").unwrap();
        assert_eq!(nginx.version.as_deref(), Some("1.25.3"));
        assert_eq!(nginx.source, EvidenceSource::Header);

        let wordpress = techs.iter().find(|t| t.name == "WordPress").unwrap();
        assert_eq!(wordpress.version.as_deref(), Some("6.4.2"));
        assert_eq!(wordpress.category, "CMS");
    }

    #[test]
    fn technology_appears_once_even_when_several_rules_match() {
        let body = r#"<a href="/wp-login.php">Login</a><img src="/wp-content/uploads/a.png">"#;
        let techs = detect_technologies(body, &BTreeMap::new(), &[]);
        assert_eq!(techs.iter().filter(|t| t.name == "WordPress").count(), 1);
    }

    #[test]
    fn cookies_and_headers_are_signals() {
        let h = headers(&[("set-cookie", "lang=en; path=/"), ("x-powered-by", "Express")]);
        let cookies = vec![
            "laravel_session=abc; path=/; httponly".to_string(),
            "csrftoken=def; path=/".to_string(),
            "lang=en; path=/".to_string(),
        ];
        let techs = detect_technologies("<html></html>", &h, &cookies);
        assert_eq!(names(&techs), vec!["Django", "Express", "Laravel"]);
    }

    #[test]
    fn plain_page_yields_empty_set() {
        let techs = detect_technologies("<html><body>hello</body></html>", &BTreeMap::new(), &[]);
        assert!(techs.is_empty());
    }

    #[test]
    fn output_is_deterministic() {
        let h = headers(&[("server", "Apache/2.4.57 (Debian)")]);
        let body = r#"<div id="___gatsby"></div><script src="/_next/static/chunks/main.js"></script>"#;
        let first = detect_technologies(body, &h, &[]);
        let second = detect_technologies(body, &h, &[]);
        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["Apache", "Gatsby", "Next.js"]);
    }
}
