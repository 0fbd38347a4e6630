use crate::config::Config;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use sitegraph_core::{CrawlDeps, CrawlError, execute_crawl};
use sitegraph_scanner::{HtmlLinkExtractor, HttpFetcher, ScanError};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared by every request. Each crawl still builds its own frontier and
/// graph; only the HTTP client and settings are reused.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub deps: CrawlDeps,
}

impl AppState {
    pub fn new(config: Config, deps: CrawlDeps) -> Self {
        Self {
            config: Arc::new(config),
            deps,
        }
    }

    /// Wire the reqwest fetcher and HTML extractor from `config`.
    pub fn from_config(config: Config) -> Result<Self, ScanError> {
        let fetcher = HttpFetcher::new(&config.fetcher_options())?;
        let deps = CrawlDeps {
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(HtmlLinkExtractor),
        };
        Ok(Self::new(config, deps))
    }
}

#[derive(Error, Debug)]
pub enum CrawlRequestError {
    #[error("URL is missing")]
    MissingUrl,

    #[error("Invalid value for deep")]
    InvalidDepth,

    #[error("Failed to extract hostname")]
    Hostname(#[source] CrawlError),
}

impl IntoResponse for CrawlRequestError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingUrl | Self::InvalidDepth => StatusCode::BAD_REQUEST,
            Self::Hostname(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CrawlParams {
    pub url: Option<String>,
    pub deep: Option<String>,
}

/// `deep` is the page cap. Absent or empty means no cap, as does `0`.
pub fn parse_max_pages(deep: Option<&str>) -> Result<usize, CrawlRequestError> {
    match deep.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| CrawlRequestError::InvalidDepth),
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/crawl", get(crawl))
        .route("/health", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
}

async fn health() -> &'static str {
    "ok"
}

async fn crawl(
    State(state): State<AppState>,
    Query(params): Query<CrawlParams>,
) -> Result<String, CrawlRequestError> {
    let url = params
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or(CrawlRequestError::MissingUrl)?;
    let max_pages = parse_max_pages(params.deep.as_deref())?;

    info!("Crawl requested for {} (max pages: {})", url, max_pages);
    let options = state.config.crawl_options(url.trim(), max_pages);
    let report = execute_crawl(options, state.deps.clone(), None)
        .await
        .map_err(|e| {
            warn!("Rejecting crawl of {}: {}", url, e);
            CrawlRequestError::Hostname(e)
        })?;

    info!(
        "Crawl of {} finished with {} pages ({:?})",
        report.hostname,
        report.pages.len(),
        report.termination
    );
    Ok(report.render())
}
