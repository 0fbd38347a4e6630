//! URL normalization and domain scoping.
//!
//! Every href pulled out of a page goes through [`normalize`] before it can
//! become an edge or a frontier entry. Anything that cannot be turned into an
//! http(s) URL collapses to the page URL itself, which the engine then drops
//! as a self-link.

use url::{ParseError, Url};

const FETCHABLE_SCHEMES: [&str; 2] = ["http", "https"];

/// Resolve `href` against `base` and return the absolute URL without its
/// fragment.
///
/// Returns `base` unchanged when `href` is unparseable, when it carries a
/// scheme we cannot fetch (`mailto:`, `tel:`, `javascript:` ...), or when
/// `base` itself is not a valid URL.
pub fn normalize(href: &str, base: &str) -> String {
    match Url::parse(href) {
        Ok(absolute) if !FETCHABLE_SCHEMES.contains(&absolute.scheme()) => {
            return base.to_string();
        }
        Ok(_) | Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return base.to_string(),
    }

    let Ok(base_url) = Url::parse(base) else {
        return base.to_string();
    };

    match base_url.join(href) {
        Ok(mut resolved) => {
            resolved.set_fragment(None);
            resolved.to_string()
        }
        Err(_) => base.to_string(),
    }
}

/// True when both URLs parse and share the same host name. Scheme and port
/// are not compared.
pub fn is_same_domain(href: &str, base: &str) -> bool {
    let (Ok(base_url), Ok(parsed)) = (Url::parse(base), Url::parse(href)) else {
        return false;
    };
    parsed.host_str() == base_url.host_str()
}

/// Query-bearing URLs are never crawled.
pub fn has_query(url: &str) -> bool {
    url.contains('?')
}

/// Parsed-and-reserialized form of the seed so `http://x.test` and
/// `http://x.test/` name the same page. Unparseable seeds pass through.
pub fn canonical_seed(seed: &str) -> String {
    match Url::parse(seed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => seed.to_string(),
    }
}

/// Host name of `url`, if it has one.
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
