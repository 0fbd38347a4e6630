pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod frontier;
pub mod graph;
pub mod normalize;
pub mod result;

pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use extract::{HtmlLinkExtractor, LinkExtractor};
pub use fetch::{Fetcher, HttpFetcher, HttpFetcherOptions};
pub use graph::LinkGraph;
pub use result::{CrawlOutcome, Termination};
