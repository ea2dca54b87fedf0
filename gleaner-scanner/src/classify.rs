use crate::pattern::SCRIPT_SUFFIX_REGEX;
use crate::result::DiscoveredUrl;
use crate::session::ScrapeSession;
use tracing::debug;

pub const DEFAULT_CDN_MARKERS: &[&str] = &["cloudflare", "cloudfront"];
pub const DEFAULT_CLOUD_MARKERS: &[&str] = &["aws"];

/// Decides which discovered URLs get fetched next and which point at cloud
/// infrastructure.
///
/// A URL is followed when it is a script (`.js`, optional query) served
/// either from a CDN host or from the page's own host. A URL is cloud
/// hosted when its text contains a cloud marker. Each decision only looks
/// at the record itself, so both passes can be re-run safely.
#[derive(Debug, Clone)]
pub struct Classifier {
    cdn_markers: Vec<String>,
    cloud_markers: Vec<String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            cdn_markers: DEFAULT_CDN_MARKERS.iter().map(|m| m.to_string()).collect(),
            cloud_markers: DEFAULT_CLOUD_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn with_cdn_markers(mut self, markers: Vec<String>) -> Self {
        self.cdn_markers = markers;
        self
    }

    pub fn with_cloud_markers(mut self, markers: Vec<String>) -> Self {
        self.cloud_markers = markers;
        self
    }

    pub fn cdn_markers(&self) -> &[String] {
        &self.cdn_markers
    }

    pub fn cloud_markers(&self) -> &[String] {
        &self.cloud_markers
    }

    pub fn is_cdn_script(&self, url: &DiscoveredUrl) -> bool {
        SCRIPT_SUFFIX_REGEX.is_match(&url.url)
            && self
                .cdn_markers
                .iter()
                .any(|marker| url.hostname.contains(marker.as_str()))
    }

    pub fn is_same_site_script(&self, url: &DiscoveredUrl, root_hostname: &str) -> bool {
        !root_hostname.is_empty()
            && url.hostname.contains(root_hostname)
            && SCRIPT_SUFFIX_REGEX.is_match(&url.url)
    }

    pub fn is_cloud_hosted(&self, url: &DiscoveredUrl) -> bool {
        self.cloud_markers
            .iter()
            .any(|marker| url.url.contains(marker.as_str()))
    }

    pub fn mark_urls_to_follow(&self, session: &mut ScrapeSession) {
        let root = session.root_hostname.as_str();
        for url in session.discovered_urls.iter_mut() {
            url.follow = self.is_cdn_script(url) || self.is_same_site_script(url, root);
            if url.follow {
                debug!("Follow: {}", url.url);
            }
        }
    }

    pub fn mark_cloud_hosted(&self, session: &mut ScrapeSession) {
        for url in session.discovered_urls.iter_mut() {
            url.cloud_hosted = self.is_cloud_hosted(url);
            if url.cloud_hosted {
                debug!("Cloud hosted: {}", url.url);
            }
        }
    }

    pub fn classify(&self, session: &mut ScrapeSession) {
        self.mark_urls_to_follow(session);
        self.mark_cloud_hosted(session);
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
