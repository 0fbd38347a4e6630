use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use url::Url;

/// One path segment of the sitemap tree.
///
/// Children are kept in a `BTreeMap` so rendering order is lexicographic no
/// matter which order the crawl discovered the pages in.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapNode {
    pub segment: String,
    pub children: BTreeMap<String, SitemapNode>,
}

impl SitemapNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            children: BTreeMap::new(),
        }
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for child in self.children.values() {
            out.push_str(&"  ".repeat(depth));
            out.push('-');
            out.push_str(&child.segment);
            out.push('\n');
            child.render_into(out, depth + 1);
        }
    }
}

/// Path-prefix tree over the crawled URLs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Sitemap {
    pub root: SitemapNode,
}

impl Sitemap {
    /// Unparseable URLs are skipped; empty segments (`//`, trailing `/`) are
    /// ignored, so `/a/` and `/a` land on the same node. Segments are
    /// percent-decoded, so `/my%20page` shows up as `my page`; a segment that
    /// does not decode to UTF-8 is kept as written.
    pub fn build<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = SitemapNode::new("");
        for url in urls {
            let Ok(parsed) = Url::parse(url.as_ref()) else {
                continue;
            };
            let mut node = &mut root;
            for raw in parsed.path().split('/').filter(|s| !s.is_empty()) {
                let segment = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
                node = node
                    .children
                    .entry(segment.to_string())
                    .or_insert_with(|| SitemapNode::new(&segment));
            }
        }
        Self { root }
    }

    /// Indented pre-order listing: two spaces per level starting at one, a
    /// `-` marker, then the segment.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.root.render_into(&mut out, 1);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_prefixes_merge() {
        let sitemap = Sitemap::build([
            "http://x.test/a/b",
            "http://x.test/a/c",
            "http://x.test/d",
        ]);
        assert_eq!(sitemap.render(), "  -a\n    -b\n    -c\n  -d\n");
    }

    #[test]
    fn test_root_only_renders_nothing() {
        let sitemap = Sitemap::build(["http://x.test/"]);
        assert!(sitemap.is_empty());
        assert_eq!(sitemap.render(), "");
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let sitemap = Sitemap::build(["http://x.test//a//b/", "http://x.test/a"]);
        assert_eq!(sitemap.render(), "  -a\n    -b\n");
    }

    #[test]
    fn test_unparseable_urls_are_skipped() {
        let sitemap = Sitemap::build(["not a url", "http://x.test/ok"]);
        assert_eq!(sitemap.render(), "  -ok\n");
    }

    #[test]
    fn test_query_and_fragment_do_not_become_segments() {
        let sitemap = Sitemap::build(["http://x.test/a?x=1#frag"]);
        assert_eq!(sitemap.render(), "  -a\n");
    }
}
