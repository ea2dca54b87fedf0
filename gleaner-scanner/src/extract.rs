use crate::pattern::{HOSTNAME_REGEX, IPV4_REGEX, URL_REGEX, tld_of};
use crate::result::DiscoveredUrl;
use crate::session::ScrapeSession;
use crate::tld::TldRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Pulls IPv4 addresses and TLD-validated URLs out of raw text.
///
/// Chunks are scanned independently. A match that straddles two chunks is
/// not reassembled.
#[derive(Debug, Clone)]
pub struct Extractor {
    registry: Arc<TldRegistry>,
}

impl Extractor {
    pub fn new(registry: Arc<TldRegistry>) -> Self {
        Self { registry }
    }

    /// Every dotted quad in `chunk`, verbatim and in order.
    pub fn extract_ips(chunk: &str) -> Vec<String> {
        IPV4_REGEX
            .find_iter(chunk)
            .map(|m| {
                debug!("--> ip: {}", m.as_str());
                m.as_str().to_string()
            })
            .collect()
    }

    /// Every URL candidate in `chunk` whose hostname ends in a registered TLD.
    pub fn extract_urls(&self, chunk: &str) -> Vec<DiscoveredUrl> {
        let mut urls = Vec::new();

        for raw in URL_REGEX.find_iter(chunk) {
            let raw_url = raw.as_str();
            let Some(raw_hostname) = HOSTNAME_REGEX.find(raw_url) else {
                continue;
            };
            let Some(tld) = tld_of(raw_hostname.as_str()) else {
                continue;
            };

            if !self.registry.is_valid_tld(tld) {
                debug!("Discarding {} (unknown TLD '{}')", raw_url, tld);
                continue;
            }

            let url = DiscoveredUrl::from_raw(raw_url, raw_hostname.as_str());
            info!("---> url: {}", url.url);
            info!("---> hostname: {}", url.hostname);
            urls.push(url);
        }

        urls
    }

    pub fn scan_chunk(&self, chunk: &str, session: &mut ScrapeSession) {
        session.discovered_ips.extend(Self::extract_ips(chunk));
        session.discovered_urls.extend(self.extract_urls(chunk));
    }
}
