use crate::graph::LinkGraph;
use serde::{Deserialize, Serialize};

/// Why the engine stopped draining the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The crawled-URL log reached the configured page cap.
    PageLimit,
    /// Nothing was processed for a full idle window.
    Idle,
}

/// Everything one crawl run produced.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub seed: String,
    /// Crawled-URL log, in processing order.
    pub crawled: Vec<String>,
    pub graph: LinkGraph,
    pub termination: Termination,
}

impl CrawlOutcome {
    pub fn pages_crawled(&self) -> usize {
        self.crawled.len()
    }
}
