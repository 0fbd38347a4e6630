use crate::error::{CrawlError, Result};
use crate::sitemap::Sitemap;
use serde::Serialize;
use sitegraph_scanner::normalize::hostname;
use sitegraph_scanner::{
    Crawler, Fetcher, LinkExtractor, LinkGraph, ProgressCallback, Termination,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    /// `0` means no page cap.
    pub max_pages: usize,
    pub max_concurrency: usize,
    pub idle_timeout: Duration,
    pub check_interval: Duration,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: 0,
            max_concurrency: 8,
            idle_timeout: Duration::from_secs(10),
            check_interval: Duration::from_secs(1),
        }
    }
}

/// The collaborators a crawl needs to reach the network.
#[derive(Clone)]
pub struct CrawlDeps {
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
}

/// Finished crawl, ready to render.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub hostname: String,
    pub seed: String,
    pub pages: Vec<String>,
    pub graph: LinkGraph,
    pub sitemap: Sitemap,
    pub termination: Termination,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    hostname: &'a str,
    seed: &'a str,
    termination: Termination,
    pages: &'a [String],
    edges: Vec<(&'a str, &'a str)>,
    sitemap: &'a Sitemap,
}

impl CrawlReport {
    /// Hostname line followed by the indented sitemap tree.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.hostname, self.sitemap.render())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut edges: Vec<(&str, &str)> = self.graph.edges().collect();
        edges.sort_unstable();
        serde_json::to_string_pretty(&ReportJson {
            hostname: &self.hostname,
            seed: &self.seed,
            termination: self.termination,
            pages: &self.pages,
            edges,
            sitemap: &self.sitemap,
        })
    }
}

/// Execute a crawl with the given options.
///
/// Fails only when the seed has no hostname; that check runs before any
/// request is made.
pub async fn execute_crawl(
    options: CrawlOptions,
    deps: CrawlDeps,
    progress_callback: Option<ProgressCallback>,
) -> Result<CrawlReport> {
    let CrawlOptions {
        url,
        max_pages,
        max_concurrency,
        idle_timeout,
        check_interval,
    } = options;

    let hostname = hostname(&url).ok_or_else(|| CrawlError::MissingHostname(url.clone()))?;

    let mut crawler = Crawler::new(deps.fetcher, deps.extractor)
        .with_max_pages(max_pages)
        .with_max_concurrency(max_concurrency)
        .with_idle_timeout(idle_timeout)
        .with_check_interval(check_interval);
    if let Some(callback) = progress_callback {
        crawler = crawler.with_progress_callback(callback);
    }

    let outcome = crawler.crawl(&url).await;
    let sitemap = Sitemap::build(&outcome.crawled);
    info!(
        "Sitemap for {} built from {} pages",
        hostname,
        outcome.pages_crawled()
    );

    Ok(CrawlReport {
        hostname,
        seed: outcome.seed,
        pages: outcome.crawled,
        graph: outcome.graph,
        sitemap,
        termination: outcome.termination,
    })
}
