use crate::config::Config;
use crate::server::{AppState, create_router};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitegraph_core::{CrawlDeps, execute_crawl};
use sitegraph_scanner::{HtmlLinkExtractor, HttpFetcher, ProgressCallback};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Install the global tracing subscriber. `RUST_LOG` wins over `default`.
pub fn init_logging(default: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

pub async fn handle_serve(args: &ArgMatches) -> Result<()> {
    let config_path = args
        .get_one::<String>("config")
        .context("missing --config")?;
    let config = Config::load(config_path)?;
    let listen = args
        .get_one::<String>("listen")
        .cloned()
        .unwrap_or_else(|| config.server.listen.clone());

    info!(
        "Idle timeout {}s, check interval {:?}, {} workers per crawl",
        config.timeout,
        config.check_interval(),
        config.crawl.max_concurrency
    );

    let app = create_router(AppState::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;
    info!("sitegraph listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, stopping server");
    }
}

pub async fn handle_crawl(args: &ArgMatches) -> Result<()> {
    let url = args.get_one::<Url>("url").context("missing --url")?;
    let max_pages = args.get_one::<usize>("deep").copied().unwrap_or(0);
    let config_path = args
        .get_one::<String>("config")
        .context("missing --config")?;
    let json = args.get_flag("json");
    let path_to = args.get_one::<String>("path-to");

    let config = Config::load(config_path)?;
    let deps = CrawlDeps {
        fetcher: Arc::new(HttpFetcher::new(&config.fetcher_options())?),
        extractor: Arc::new(HtmlLinkExtractor),
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Crawling {}", url));

    let spinner_clone = spinner.clone();
    let progress: ProgressCallback = Arc::new(move |count: usize, page: String| {
        spinner_clone.set_message(format!("[{}] {}", count, page));
    });

    let report = execute_crawl(
        config.crawl_options(url.as_str(), max_pages),
        deps,
        Some(progress),
    )
    .await?;
    spinner.finish_and_clear();

    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    eprintln!(
        "{} Crawled {} pages, {} links",
        "✓".green().bold(),
        report.pages.len(),
        report.graph.edge_count()
    );
    print!("{}", report.render());
    if report.sitemap.is_empty() {
        eprintln!("{} no pages below the site root were crawled", "!".yellow());
    }

    if let Some(target) = path_to {
        match report.graph.find_path(&report.seed, target) {
            Some(path) => println!("\n{}\n  {}", "Path:".bright_white().bold(), path.join(" -> ")),
            None => println!("\n{} no link path from {} to {}", "✗".red(), report.seed, target),
        }
    }
    Ok(())
}

/// Build `<endpoint>/crawl?url=..&deep=..` with proper query encoding.
pub fn build_crawl_request(endpoint: &Url, url: &str, deep: Option<usize>) -> Result<Url> {
    let mut request = endpoint
        .join("crawl")
        .map_err(|e| anyhow!("invalid endpoint {}: {}", endpoint, e))?;
    {
        let mut query = request.query_pairs_mut();
        query.append_pair("url", url);
        if let Some(deep) = deep {
            query.append_pair("deep", &deep.to_string());
        }
    }
    Ok(request)
}

pub async fn handle_client(args: &ArgMatches) -> Result<()> {
    let url = args.get_one::<String>("url").context("missing --url")?;
    let deep = args.get_one::<usize>("deep").copied();
    let endpoint = args
        .get_one::<Url>("endpoint")
        .context("missing --endpoint")?;

    let request = build_crawl_request(endpoint, url, deep)?;
    eprintln!("{} Generating response...", "→".blue());

    let response = reqwest::get(request.clone())
        .await
        .with_context(|| format!("request to {} failed", request))?;
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        eprintln!("{} Response received:", "✓".green().bold());
        print!("{}", body);
        Ok(())
    } else {
        Err(anyhow!("server answered {}: {}", status, body.trim()))
    }
}
