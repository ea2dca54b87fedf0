use serde::{Deserialize, Serialize};

/// A URL found in page text, validated against the TLD registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredUrl {
    pub url: String,
    pub hostname: String,
    pub follow: bool,
    pub cloud_hosted: bool,
}

impl DiscoveredUrl {
    pub fn new(url: String, hostname: String) -> Self {
        Self {
            url,
            hostname,
            follow: false,
            cloud_hosted: false,
        }
    }

    /// Builds a record from a raw pattern match, dropping the leading
    /// `"`, `'` or `/` marker the hostname pattern anchors on.
    pub fn from_raw(raw_url: &str, raw_hostname: &str) -> Self {
        Self::new(
            strip_marker(raw_url).to_string(),
            strip_marker(raw_hostname).to_string(),
        )
    }
}

pub(crate) fn strip_marker(raw: &str) -> &str {
    raw.strip_prefix(['"', '\'', '/']).unwrap_or(raw)
}
