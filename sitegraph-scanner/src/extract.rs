use scraper::{Html, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Pulls raw href strings out of a page body.
pub trait LinkExtractor: Send + Sync {
    fn extract(&self, body: &str) -> Vec<String>;
}

/// Collects every non-empty `<a href>` in document order.
///
/// html5ever never rejects input, so a malformed document just yields
/// whatever anchors it managed to recover, possibly none.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);
        document
            .select(&LINK_SELECTOR)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect()
    }
}
