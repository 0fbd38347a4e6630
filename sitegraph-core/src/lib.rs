pub mod crawl;
pub mod error;
pub mod sitemap;

pub use crawl::{CrawlDeps, CrawlOptions, CrawlReport, execute_crawl};
pub use error::CrawlError;
pub use sitemap::{Sitemap, SitemapNode};
