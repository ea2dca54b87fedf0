pub mod classify;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod pattern;
pub mod result;
pub mod session;
pub mod tld;

pub use classify::Classifier;
pub use error::ScanError;
pub use extract::Extractor;
pub use fetcher::{Fetcher, HttpFetcher};
pub use result::DiscoveredUrl;
pub use session::ScrapeSession;
pub use tld::TldRegistry;
