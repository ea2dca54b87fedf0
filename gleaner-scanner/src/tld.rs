//! Whitelist of top-level domains used to reject hostname-looking text
//! (`"config.json`, `/app.min`) that is not a real host.

use crate::error::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Built-in registry contents in the IANA `tlds-alpha-by-domain.txt`
/// layout, IDN names in their `xn--` form.
pub const BUNDLED_TLDS: &str = include_str!("../data/tlds-alpha-by-domain.txt");

/// Immutable set of recognised top-level domains.
///
/// Lookups are case-sensitive against whatever was stored. The bundled set
/// and anything loaded with [`TldRegistry::from_file`] are lowercase.
#[derive(Debug, Clone)]
pub struct TldRegistry {
    names: HashSet<String>,
}

impl TldRegistry {
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_TLDS)
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads a registry from a file in the IANA `tlds-alpha-by-domain.txt`
    /// layout: one name per line, `#` comments and blank lines skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let registry = Self::parse(&content);
        debug!("Loaded {} TLDs from {}", registry.len(), path.display());
        Ok(registry)
    }

    /// One name per line, `#` comments and blank lines skipped, lowercased.
    pub fn parse(content: &str) -> Self {
        Self::from_names(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_lowercase),
        )
    }

    pub fn is_valid_tld(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TldRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}
