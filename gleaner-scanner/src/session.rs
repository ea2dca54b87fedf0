use crate::result::DiscoveredUrl;

/// Everything found while scanning one page.
///
/// A session is built fresh for every page, filled by the extractor chunk by
/// chunk, then classified in place once the whole page has been consumed.
#[derive(Debug, Clone, Default)]
pub struct ScrapeSession {
    pub root_hostname: String,
    pub discovered_urls: Vec<DiscoveredUrl>,
    pub discovered_ips: Vec<String>,
}

impl ScrapeSession {
    pub fn new(root_hostname: impl Into<String>) -> Self {
        Self {
            root_hostname: root_hostname.into(),
            discovered_urls: Vec::new(),
            discovered_ips: Vec::new(),
        }
    }

    pub fn follow_urls(&self) -> impl Iterator<Item = &DiscoveredUrl> {
        self.discovered_urls.iter().filter(|u| u.follow)
    }

    pub fn cloud_hosted_urls(&self) -> impl Iterator<Item = &DiscoveredUrl> {
        self.discovered_urls.iter().filter(|u| u.cloud_hosted)
    }
}
