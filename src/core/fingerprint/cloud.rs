// src/core/fingerprint/cloud.rs

use once_cell::sync::Lazy;
use tracing::debug;

use super::{Matcher, Rule, RuleTable, Signals};
use crate::core::models::Label;

const HOSTNAME_PRIORITY: u16 = 0;
const ISP_PRIORITY: u16 = 100;

/// Hosting-provider rules: reverse-DNS hostname patterns first, ISP names second.
pub static CLOUD_RULES: Lazy<RuleTable> = Lazy::new(|| {
    use Matcher::*;
    RuleTable::new(vec![
        Rule::new(HOSTNAME_PRIORITY, HostnameContains("amazonaws.com"), "Amazon Web Services"),
        Rule::new(HOSTNAME_PRIORITY + 1, HostnameContains("cloudfront.net"), "Amazon Web Services"),
        Rule::new(HOSTNAME_PRIORITY + 2, HostnameContains("googleusercontent.com"), "Google Cloud"),
        Rule::new(HOSTNAME_PRIORITY + 3, HostnameContains("1e100.net"), "Google Cloud"),
        Rule::new(HOSTNAME_PRIORITY + 4, HostnameContains("cloudapp.azure.com"), "Microsoft Azure"),
        Rule::new(HOSTNAME_PRIORITY + 5, HostnameContains("cloudapp.net"), "Microsoft Azure"),
        Rule::new(HOSTNAME_PRIORITY + 6, HostnameContains("azurewebsites.net"), "Microsoft Azure"),
        Rule::new(HOSTNAME_PRIORITY + 7, HostnameContains("digitalocean"), "DigitalOcean"),
        Rule::new(HOSTNAME_PRIORITY + 8, HostnameContains("linodeusercontent.com"), "Linode"),
        Rule::new(HOSTNAME_PRIORITY + 9, HostnameContains("members.linode.com"), "Linode"),
        Rule::new(HOSTNAME_PRIORITY + 10, HostnameContains("vultrusercontent.com"), "Vultr"),
        Rule::new(HOSTNAME_PRIORITY + 11, HostnameContains("your-server.de"), "Hetzner"),
        Rule::new(HOSTNAME_PRIORITY + 12, HostnameContains("hetzner"), "Hetzner"),
        Rule::new(HOSTNAME_PRIORITY + 13, HostnameContains("ovh.net"), "OVHcloud"),
        Rule::new(HOSTNAME_PRIORITY + 14, HostnameContains("oraclecloud.com"), "Oracle Cloud"),
        Rule::new(HOSTNAME_PRIORITY + 15, HostnameContains("aliyun"), "Alibaba Cloud"),
        Rule::new(HOSTNAME_PRIORITY + 16, HostnameContains("cloudflare"), "Cloudflare"),
        Rule::new(HOSTNAME_PRIORITY + 17, HostnameContains("fastly"), "Fastly"),
        Rule::new(HOSTNAME_PRIORITY + 18, HostnameContains("akamaitechnologies.com"), "Akamai"),
        Rule::new(HOSTNAME_PRIORITY + 19, HostnameContains("herokuapp.com"), "Heroku"),
        Rule::new(ISP_PRIORITY, IspContains("amazon"), "Amazon Web Services"),
        Rule::new(ISP_PRIORITY + 1, IspContains("google"), "Google Cloud"),
        Rule::new(ISP_PRIORITY + 2, IspContains("microsoft"), "Microsoft Azure"),
        Rule::new(ISP_PRIORITY + 3, IspContains("digitalocean"), "DigitalOcean"),
        Rule::new(ISP_PRIORITY + 4, IspContains("linode"), "Linode"),
        Rule::new(ISP_PRIORITY + 5, IspContains("vultr"), "Vultr"),
        Rule::new(ISP_PRIORITY + 6, IspContains("hetzner"), "Hetzner"),
        Rule::new(ISP_PRIORITY + 7, IspContains("ovh"), "OVHcloud"),
        Rule::new(ISP_PRIORITY + 8, IspContains("oracle"), "Oracle Cloud"),
        Rule::new(ISP_PRIORITY + 9, IspContains("alibaba"), "Alibaba Cloud"),
        Rule::new(ISP_PRIORITY + 10, IspContains("cloudflare"), "Cloudflare"),
    ])
});

/// Infers the hosting provider from a resolved address, its reverse hostname and ISP.
pub fn detect_cloud_provider(ip: &str, hostname: &str, isp: &str) -> Option<Label> {
    let signals = Signals {
        hostname: Some(hostname).filter(|h| !h.is_empty()),
        isp: Some(isp).filter(|i| !i.is_empty()),
        ..Default::default()
    };
    let label = CLOUD_RULES.first_match(&signals);
    debug!(ip, hostname, cloud = ?label.as_ref().map(|l| l.name.as_str()), "Cloud provider detection finished.");
    label
}
