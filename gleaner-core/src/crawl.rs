use gleaner_scanner::error::{Result, ScanError};
use gleaner_scanner::fetcher::{DEFAULT_CHUNK_SIZE, Fetcher, read_chunks, target_hostname};
use gleaner_scanner::{Classifier, DiscoveredUrl, Extractor, ScrapeSession, TldRegistry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Options for configuring a scrape
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub max_level: usize,
    pub depth_mode: DepthMode,
    pub chunk_size: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_level: 1,
            depth_mode: DepthMode::PerUrl,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// How followed URLs consume the depth budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthMode {
    /// Every followed URL costs one level, so a page at depth `d` fetches at
    /// most `max_level - d` children and the k-th of them runs at `d + k`
    #[default]
    PerUrl,
    /// All followed URLs on a page share one level and run at `d + 1`
    PerLevel,
}

impl DepthMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "per-url" | "url" => Some(DepthMode::PerUrl),
            "per-level" | "level" => Some(DepthMode::PerLevel),
            _ => None,
        }
    }
}

/// Callback receiving the hostname of every cloud-hosted URL, in discovery order
pub type HostCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Outcome of scraping one page, with the pages it led to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub target: String,
    pub hostname: String,
    pub depth: usize,
    pub discovered_ips: Vec<String>,
    pub discovered_urls: Vec<DiscoveredUrl>,
    pub children: Vec<PageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageReport {
    fn from_session(target: &str, depth: usize, session: ScrapeSession) -> Self {
        Self {
            target: target.to_string(),
            hostname: session.root_hostname,
            depth,
            discovered_ips: session.discovered_ips,
            discovered_urls: session.discovered_urls,
            children: Vec::new(),
            error: None,
        }
    }

    fn failed(target: &str, depth: usize, error: &ScanError) -> Self {
        Self {
            target: target.to_string(),
            hostname: target_hostname(target).unwrap_or_default(),
            depth,
            discovered_ips: Vec::new(),
            discovered_urls: Vec::new(),
            children: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Cloud-hosted hostnames of this page followed by those of its
    /// children, depth first.
    pub fn cloud_hostnames(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .discovered_urls
            .iter()
            .filter(|u| u.cloud_hosted)
            .map(|u| u.hostname.clone())
            .collect();
        for child in &self.children {
            hosts.extend(child.cloud_hostnames());
        }
        hosts
    }

    pub fn page_count(&self) -> usize {
        1 + self.children.iter().map(PageReport::page_count).sum::<usize>()
    }

    pub fn failed_count(&self) -> usize {
        usize::from(self.error.is_some())
            + self.children.iter().map(PageReport::failed_count).sum::<usize>()
    }

    pub fn total_urls(&self) -> usize {
        self.discovered_urls.len() + self.children.iter().map(PageReport::total_urls).sum::<usize>()
    }

    pub fn total_ips(&self) -> usize {
        self.discovered_ips.len() + self.children.iter().map(PageReport::total_ips).sum::<usize>()
    }

    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(PageReport::max_depth)
            .max()
            .unwrap_or(self.depth)
    }
}

/// Fetches pages, scans them and follows script URLs up to `max_level` hops.
///
/// The controller only holds configuration; the depth reached so far is
/// passed down each recursive call, so one controller can run any number
/// of scrapes one after another.
pub struct ScrapeController<F: Fetcher> {
    fetcher: F,
    extractor: Extractor,
    classifier: Classifier,
    options: CrawlOptions,
    host_callback: Option<HostCallback>,
}

impl<F: Fetcher> ScrapeController<F> {
    pub fn new(fetcher: F, registry: Arc<TldRegistry>) -> Self {
        Self {
            fetcher,
            extractor: Extractor::new(registry),
            classifier: Classifier::new(),
            options: CrawlOptions::default(),
            host_callback: None,
        }
    }

    pub fn with_options(mut self, options: CrawlOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_host_callback(mut self, callback: HostCallback) -> Self {
        self.host_callback = Some(callback);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Downloads `target` and scrapes it as the root of a new crawl.
    pub async fn scrape_site(&self, target: &str) -> Result<PageReport> {
        self.scrape_site_at(target, 0).await
    }

    /// Scrapes an existing page dump, treating `hostname` as the site it
    /// came from.
    pub async fn scrape_local_file(&self, hostname: &str, local_filename: &str) -> Result<PageReport> {
        if local_filename.is_empty() {
            return Err(ScanError::EmptyTarget);
        }
        info!("Scraping local file {}", local_filename);
        self.scrape_file_at(local_filename, hostname, Path::new(local_filename), 0)
            .await
    }

    /// Batch entry point for a file of sites. Not implemented: always
    /// succeeds without doing anything.
    pub async fn scrape_site_list(&self, target_site_list_filename: &str) -> Result<()> {
        debug!(
            "Site list scraping is not implemented, ignoring {}",
            target_site_list_filename
        );
        Ok(())
    }

    async fn scrape_site_at(&self, target: &str, depth: usize) -> Result<PageReport> {
        let hostname = target_hostname(target)?;

        info!("Downloading {} (depth {})", target, depth);
        let dump = self.fetcher.fetch(target).await.inspect_err(|e| {
            error!("Download of {} did not work: {}", target, e);
        })?;

        self.scrape_file_at(target, &hostname, &dump, depth).await
    }

    async fn scrape_file_at(
        &self,
        target: &str,
        hostname: &str,
        path: &Path,
        depth: usize,
    ) -> Result<PageReport> {
        let session = self.scan(hostname, path).await?;
        Ok(self.dispatch(target, session, depth).await)
    }

    async fn scan(&self, hostname: &str, path: &Path) -> Result<ScrapeSession> {
        let mut session = ScrapeSession::new(hostname);

        read_chunks(path, self.options.chunk_size, |chunk| {
            self.extractor.scan_chunk(chunk, &mut session)
        })
        .await
        .inspect_err(|e| error!("Scanning {} failed: {}", path.display(), e))?;

        self.classifier.classify(&mut session);
        debug!(
            "{}: {} urls, {} ips, {} to follow",
            hostname,
            session.discovered_urls.len(),
            session.discovered_ips.len(),
            session.follow_urls().count()
        );
        Ok(session)
    }

    async fn dispatch(&self, target: &str, session: ScrapeSession, depth: usize) -> PageReport {
        let max_level = self.options.max_level;
        let mut children = Vec::new();
        let mut consumed = depth;

        for url in &session.discovered_urls {
            if url.follow {
                let child_depth = match self.options.depth_mode {
                    DepthMode::PerUrl if consumed < max_level => {
                        consumed += 1;
                        Some(consumed)
                    }
                    DepthMode::PerLevel if depth < max_level => Some(depth + 1),
                    _ => None,
                };

                match child_depth {
                    Some(child_depth) => {
                        debug!("Following {} from {}", url.url, session.root_hostname);
                        let child = match Box::pin(self.scrape_site_at(&url.url, child_depth)).await {
                            Ok(child) => child,
                            Err(e) => {
                                warn!("Abandoning {}: {}", url.url, e);
                                PageReport::failed(&url.url, child_depth, &e)
                            }
                        };
                        children.push(child);
                    }
                    None => debug!("Depth limit {} reached, not following {}", max_level, url.url),
                }
            }

            if url.cloud_hosted {
                info!("Cloud hosted: {}", url.hostname);
                if let Some(ref callback) = self.host_callback {
                    callback(&url.hostname);
                }
            }
        }

        let mut report = PageReport::from_session(target, depth, session);
        report.children = children;
        report
    }
}
