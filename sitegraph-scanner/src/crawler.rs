use crate::error::Result;
use crate::extract::LinkExtractor;
use crate::fetch::Fetcher;
use crate::frontier::Frontier;
use crate::graph::LinkGraph;
use crate::normalize::{canonical_seed, has_query, is_same_domain, normalize};
use crate::result::{CrawlOutcome, Termination};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Called with `(pages_crawled, url)` each time a page is dispatched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

const DEFAULT_MAX_CONCURRENCY: usize = 8;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Frontier-driven, same-domain crawl engine.
///
/// A single engine task owns the frontier, the visited set, the crawled-URL
/// log and the link graph. Fetch-and-extract work runs on a bounded
/// [`JoinSet`] and hands raw hrefs back to the engine, which does all the
/// normalizing, scoping and bookkeeping itself.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    max_pages: usize,
    max_concurrency: usize,
    idle_timeout: Duration,
    check_interval: Duration,
    progress_callback: Option<ProgressCallback>,
}

/// Result of one fetch task.
struct PageFetch {
    url: String,
    links: Result<Vec<String>>,
}

/// Mutable state of a single run. Lives on the engine task only.
struct CrawlRun {
    seed: String,
    frontier: Frontier,
    graph: LinkGraph,
    crawled: Vec<String>,
    last_activity: Instant,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn LinkExtractor>) -> Self {
        Self {
            fetcher,
            extractor,
            max_pages: 0,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            check_interval: DEFAULT_CHECK_INTERVAL,
            progress_callback: None,
        }
    }

    /// Stop once this many pages are in the crawled-URL log. `0` disables
    /// the cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        // tokio intervals panic on a zero period
        self.check_interval = check_interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl from `seed` until the page cap is reached or the engine has been
    /// idle for a full idle window with no fetch in flight. On the page cap,
    /// fetches already dispatched are allowed to finish so the last pages'
    /// links are recorded.
    ///
    /// Never fails: per-page errors are logged and the page becomes a dead
    /// end, so the caller always gets whatever was crawled.
    pub async fn crawl(&self, seed: &str) -> CrawlOutcome {
        let seed = canonical_seed(seed);
        info!(
            "Starting crawl of {} (max pages: {}, workers: {}, idle timeout: {:?})",
            seed, self.max_pages, self.max_concurrency, self.idle_timeout
        );

        let mut run = CrawlRun::new(seed.clone());
        run.frontier.push(seed);

        let mut tasks: JoinSet<PageFetch> = JoinSet::new();
        let mut ticker = time::interval_at(Instant::now() + self.check_interval, self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let termination = loop {
            if let Some(termination) = self.dispatch(&mut run, &mut tasks) {
                break termination;
            }

            tokio::select! {
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    run.last_activity = Instant::now();
                    run.collect(joined);
                }
                _ = ticker.tick() => {
                    // a pending fetch is bounded by the client timeout, not the idle window
                    let idle_for = run.last_activity.elapsed();
                    if tasks.is_empty() && idle_for >= self.idle_timeout {
                        debug!("No crawl activity for {:?}, stopping", idle_for);
                        break Termination::Idle;
                    }
                }
            }
        };

        // Pages already in the log still get their links recorded.
        if termination == Termination::PageLimit {
            while let Some(joined) = tasks.join_next().await {
                run.collect(joined);
            }
        }

        info!(
            "Crawl complete. Visited {} pages, {} links recorded, {} URLs left in the frontier ({:?})",
            run.crawled.len(),
            run.graph.edge_count(),
            run.frontier.pending(),
            termination
        );
        debug!("{} URLs marked visited", run.frontier.visited_count());
        run.finish(termination)
    }

    /// Dequeue frontier URLs while worker slots are free.
    fn dispatch(&self, run: &mut CrawlRun, tasks: &mut JoinSet<PageFetch>) -> Option<Termination> {
        while tasks.len() < self.max_concurrency {
            let Some(url) = run.frontier.pop() else {
                break;
            };
            if !run.frontier.mark_visited(&url) {
                continue;
            }
            run.last_activity = Instant::now();

            if !is_same_domain(&url, &run.seed) {
                debug!("Skipping {}: outside {}", url, run.seed);
                continue;
            }
            if has_query(&url) {
                debug!("Skipping {}: query-bearing URL", url);
                continue;
            }

            run.crawled.push(url.clone());
            run.graph.add_vertex(&url);

            if let Some(ref callback) = self.progress_callback {
                callback(run.crawled.len(), url.clone());
            }

            let fetcher = self.fetcher.clone();
            let extractor = self.extractor.clone();
            tasks.spawn(async move {
                let links = fetcher
                    .fetch(&url)
                    .await
                    .map(|body| extractor.extract(&body));
                PageFetch { url, links }
            });

            if self.max_pages > 0 && run.crawled.len() >= self.max_pages {
                debug!("Page limit of {} reached", self.max_pages);
                return Some(Termination::PageLimit);
            }
        }
        None
    }
}

impl CrawlRun {
    fn new(seed: String) -> Self {
        Self {
            seed,
            frontier: Frontier::new(),
            graph: LinkGraph::new(),
            crawled: Vec::new(),
            last_activity: Instant::now(),
        }
    }

    fn collect(&mut self, joined: std::result::Result<PageFetch, JoinError>) {
        match joined {
            Ok(page) => self.absorb(page),
            Err(e) => warn!("Fetch task failed: {}", e),
        }
    }

    /// Turn a finished fetch into edges and frontier entries.
    fn absorb(&mut self, page: PageFetch) {
        let hrefs = match page.links {
            Ok(hrefs) => hrefs,
            Err(e) => {
                warn!("Crawl error for {}: {}", page.url, e);
                return;
            }
        };
        debug!("{} links found on {}", hrefs.len(), page.url);

        for href in hrefs {
            let target = normalize(&href, &page.url);
            if target == page.url {
                continue;
            }
            if has_query(&target) || !is_same_domain(&target, &self.seed) {
                debug!("  -> dropping {}", target);
                continue;
            }

            self.graph.add_edge(&page.url, &target);
            if !self.frontier.is_visited(&target) {
                self.frontier.push(target);
            }
        }
    }

    fn finish(self, termination: Termination) -> CrawlOutcome {
        CrawlOutcome {
            seed: self.seed,
            crawled: self.crawled,
            graph: self.graph,
            termination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::extract::HtmlLinkExtractor;
    use crate::fetch::{HttpFetcher, HttpFetcherOptions};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    /// In-memory site: URL -> list of hrefs. Unknown URLs fail to fetch.
    #[derive(Default)]
    struct StaticSite {
        pages: HashMap<String, Vec<String>>,
        fetched: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        latency: Option<Duration>,
    }

    impl StaticSite {
        fn page(mut self, url: &str, hrefs: &[&str]) -> Self {
            self.pages.insert(
                url.to_string(),
                hrefs.iter().map(|h| h.to_string()).collect(),
            );
            self
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    /// Bodies are just newline-separated hrefs.
    struct LineExtractor;

    impl LinkExtractor for LineExtractor {
        fn extract(&self, body: &str) -> Vec<String> {
            body.lines().map(str::to_string).collect()
        }
    }

    #[async_trait]
    impl Fetcher for StaticSite {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.fetched.lock().unwrap().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.pages
                .get(url)
                .map(|hrefs| hrefs.join("\n"))
                .ok_or_else(|| ScanError::Other(format!("no such page: {}", url)))
        }
    }

    fn crawler_for(site: Arc<StaticSite>) -> Crawler {
        Crawler::new(site, Arc::new(LineExtractor))
            .with_idle_timeout(Duration::from_secs(10))
            .with_check_interval(Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_scoping_scenario() {
        let site = Arc::new(
            StaticSite::default()
                .page(
                    "http://x.test/",
                    &["/p1", "http://other.test/p2", "/p3?x=1", "mailto:a@b.com"],
                )
                .page("http://x.test/p1", &[]),
        );

        let outcome = crawler_for(site.clone()).crawl("http://x.test/").await;

        assert_eq!(outcome.crawled, vec!["http://x.test/", "http://x.test/p1"]);
        assert_eq!(outcome.termination, Termination::Idle);
        assert_eq!(outcome.graph.neighbors("http://x.test/"), vec!["http://x.test/p1"]);
        assert!(!outcome.graph.contains("http://x.test/p3?x=1"));
        assert!(!outcome.graph.contains("http://other.test/p2"));
        assert_eq!(site.fetched().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_seed_terminates_on_idle() {
        let site = Arc::new(StaticSite::default());

        let outcome = crawler_for(site).crawl("http://x.test/start").await;

        assert_eq!(outcome.crawled, vec!["http://x.test/start"]);
        assert_eq!(outcome.termination, Termination::Idle);
        assert_eq!(outcome.graph.vertex_count(), 1);
        assert_eq!(outcome.graph.edge_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_limit_is_never_exceeded() {
        let mut site = StaticSite::default();
        for i in 0..20 {
            site = site.page(
                &format!("http://x.test/p{}", i),
                &[&format!("/p{}", i + 1), &format!("/q{}", i)],
            );
        }
        let site = Arc::new(site);

        let outcome = crawler_for(site)
            .with_max_pages(5)
            .crawl("http://x.test/p0")
            .await;

        assert_eq!(outcome.crawled.len(), 5);
        assert_eq!(outcome.termination, Termination::PageLimit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_page_fetched_once() {
        let site = Arc::new(
            StaticSite::default()
                .page("http://x.test/", &["/a", "/b", "/a", "#top"])
                .page("http://x.test/a", &["/", "/b", "http://x.test/a#frag"])
                .page("http://x.test/b", &["/a", "/", "/b"]),
        );

        let outcome = crawler_for(site.clone()).crawl("http://x.test").await;

        let mut fetched = site.fetched();
        fetched.sort();
        assert_eq!(
            fetched,
            vec!["http://x.test/", "http://x.test/a", "http://x.test/b"]
        );
        assert_eq!(outcome.crawled.len(), 3);
        assert_eq!(outcome.graph.neighbors("http://x.test/"), vec!["http://x.test/a", "http://x.test/b"]);
        assert_eq!(outcome.graph.edge_count(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_crawled_urls_stay_in_scope() {
        let site = Arc::new(
            StaticSite::default()
                .page(
                    "http://x.test/",
                    &[
                        "https://x.test:8443/secure",
                        "http://sub.x.test/",
                        "/search?q=rust",
                        "tel:+15555550100",
                        "/docs/",
                    ],
                )
                .page("https://x.test:8443/secure", &["/docs/intro"])
                .page("http://x.test/docs/", &["intro", "../about"]),
        );

        let outcome = crawler_for(site).crawl("http://x.test/").await;

        for url in &outcome.crawled {
            assert!(is_same_domain(url, "http://x.test/"), "{} left the domain", url);
            assert!(!has_query(url), "{} carries a query", url);
        }
        assert!(outcome.crawled.contains(&"https://x.test:8443/secure".to_string()));
        assert!(outcome.crawled.contains(&"http://x.test/docs/intro".to_string()));
        assert!(outcome.crawled.contains(&"http://x.test/about".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_cap() {
        let leaves: Vec<String> = (0..12).map(|i| format!("/leaf{}", i)).collect();
        let leaf_refs: Vec<&str> = leaves.iter().map(String::as_str).collect();
        let mut site = StaticSite::default()
            .page("http://x.test/", &leaf_refs)
            .with_latency(Duration::from_millis(200));
        for leaf in &leaves {
            site = site.page(&format!("http://x.test{}", leaf), &[]);
        }
        let site = Arc::new(site);

        let outcome = crawler_for(site.clone())
            .with_max_concurrency(3)
            .crawl("http://x.test/")
            .await;

        assert_eq!(outcome.crawled.len(), 13);
        let peak = site.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight fetches was {}", peak);
        assert!(peak > 1, "fetches never overlapped");
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_callback_sees_every_page() {
        let site = Arc::new(
            StaticSite::default()
                .page("http://x.test/", &["/a"])
                .page("http://x.test/a", &[]),
        );
        let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        crawler_for(site)
            .with_progress_callback(Arc::new(move |count, url| {
                seen_clone.lock().unwrap().push((count, url));
            }))
            .crawl("http://x.test/")
            .await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (1, "http://x.test/".to_string()),
                (2, "http://x.test/a".to_string())
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_limit_keeps_links_of_last_page() {
        let site = Arc::new(
            StaticSite::default()
                .page("http://x.test/", &["/a", "/b"])
                .page("http://x.test/a", &[])
                .page("http://x.test/b", &[])
                .with_latency(Duration::from_millis(500)),
        );

        let outcome = crawler_for(site.clone())
            .with_max_pages(1)
            .crawl("http://x.test/")
            .await;

        assert_eq!(outcome.crawled, vec!["http://x.test/"]);
        assert_eq!(outcome.termination, Termination::PageLimit);
        assert_eq!(outcome.graph.edge_count(), 2);
        assert_eq!(
            outcome.graph.neighbors("http://x.test/"),
            vec!["http://x.test/a", "http://x.test/b"]
        );
        assert_eq!(site.fetched(), vec!["http://x.test/"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_slower_than_idle_window() {
        let site = Arc::new(
            StaticSite::default()
                .page("http://x.test/", &["/a", "/b"])
                .page("http://x.test/a", &[])
                .page("http://x.test/b", &[])
                .with_latency(Duration::from_secs(3)),
        );

        let outcome = Crawler::new(site, Arc::new(LineExtractor))
            .with_idle_timeout(Duration::from_secs(2))
            .with_check_interval(Duration::from_secs(1))
            .crawl("http://x.test/")
            .await;

        assert_eq!(
            outcome.crawled,
            vec!["http://x.test/", "http://x.test/a", "http://x.test/b"]
        );
        assert_eq!(outcome.graph.edge_count(), 2);
        assert_eq!(outcome.termination, Termination::Idle);
    }

    /// Test basic link discovery over real HTTP
    #[tokio::test]
    async fn test_link_discovery() {
        let mock_server = MockServer::start().await;

        let root_html = format!(
            r#"<html><body>
                <a href="{}/page1">Page 1</a>
                <a href="/page2">Page 2</a>
                <a href="/page2?sort=asc">Sorted</a>
                <a href="mailto:team@example.com">Mail</a>
            </body></html>"#,
            mock_server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(root_html),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(r#"<html><body><a href="/page2">P2</a></body></html>"#),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/page2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(&HttpFetcherOptions::default()).unwrap();
        let crawler = Crawler::new(Arc::new(fetcher), Arc::new(HtmlLinkExtractor))
            .with_idle_timeout(Duration::from_millis(300))
            .with_check_interval(Duration::from_millis(50));

        let outcome = crawler.crawl(&mock_server.uri()).await;

        let mut crawled = outcome.crawled.clone();
        crawled.sort();
        assert_eq!(
            crawled,
            vec![
                format!("{}/", mock_server.uri()),
                format!("{}/page1", mock_server.uri()),
                format!("{}/page2", mock_server.uri()),
            ]
        );
        assert_eq!(outcome.termination, Termination::Idle);
        assert_eq!(
            outcome.graph.find_path(
                &format!("{}/", mock_server.uri()),
                &format!("{}/page2", mock_server.uri())
            ),
            Some(vec![
                format!("{}/", mock_server.uri()),
                format!("{}/page2", mock_server.uri()),
            ])
        );
    }
}
