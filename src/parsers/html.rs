use crate::normalize::normalize_or_skip;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector is valid"));

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// Trimmed text of `<title>`, if present and non-empty
pub fn title(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(|t| t.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

/// Outbound links resolved against `base`, deduplicated in document order.
///
/// Links without an http(s) scheme or host are dropped.
pub fn links(doc: &Html, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let links = doc
        .select(&ANCHOR)
        .filter_map(|e| e.value().attr("href"))
        .filter_map(|href| normalize_or_skip(href, Some(base)))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect::<Vec<Url>>();

    ::log::debug!("HTML parser found {} links", links.len());
    if !links.is_empty() {
        ::log::trace!(
            "First few links: {:?}",
            links.iter().take(5).map(Url::as_str).collect::<Vec<_>>()
        );
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let doc = Html::parse_document("<html><head><title>\n  My   Page </title></head></html>");
        assert_eq!(title(&doc).as_deref(), Some("My Page"));

        let doc = Html::parse_document("<html><head><title>  </title></head></html>");
        assert_eq!(title(&doc), None);

        let doc = Html::parse_document("<p>no head</p>");
        assert_eq!(title(&doc), None);
    }

    #[test]
    fn test_links_resolved_and_deduplicated() {
        let html = r##"<body>
            <a href="/about">About</a>
            <a href="team.html#lead">Team</a>
            <a href="https://other.org/x">Other</a>
            <a href="/about#again">About again</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="javascript:void(0)">JS</a>
            <a href="#top">Top</a>
            <a>No href</a>
        </body>"##;
        let base = Url::parse("https://example.com/docs/index.html").unwrap();
        let doc = Html::parse_document(html);

        let found: Vec<String> = links(&doc, &base).iter().map(|u| u.to_string()).collect();
        assert_eq!(
            found,
            vec![
                "https://example.com/about",
                "https://example.com/docs/team.html",
                "https://other.org/x",
                "https://example.com/docs/index.html",
            ]
        );
    }
}
