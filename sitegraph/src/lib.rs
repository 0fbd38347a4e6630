pub mod config;
pub mod handlers;
pub mod server;

// Re-export commonly used items for convenience
pub use config::{Config, ConfigError};
pub use handlers::build_crawl_request;
pub use server::{AppState, CrawlParams, CrawlRequestError, create_router, parse_max_pages};

// Re-export crawl functionality from sitegraph-core
pub use sitegraph_core::{CrawlDeps, CrawlOptions, CrawlReport, execute_crawl};
