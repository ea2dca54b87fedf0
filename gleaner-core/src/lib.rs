pub mod crawl;
pub mod report;

pub use crawl::{CrawlOptions, DepthMode, HostCallback, PageReport, ScrapeController};
