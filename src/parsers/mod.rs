pub mod html;
pub mod markdown;
pub mod media;


use crate::media::DiscoveredMedia;
use scraper::Html;
use url::Url;

/// Everything pulled out of one fetched page
#[derive(Debug, Clone)]
pub struct PageExtract {
    pub title: String,
    /// Main content as markdown
    pub content: String,
    /// Absolute outbound links, fragment-free, in document order
    pub links: Vec<Url>,
    /// Media candidates from the markup pass and the full-text pass
    pub media: Vec<DiscoveredMedia>,
}

/// Parse a page body fetched from `page_url`.
///
/// Malformed markup never fails: the HTML parser recovers and the
/// full-text pass still runs over the raw body.
pub fn extract(body: &str, page_url: &Url) -> PageExtract {
    let doc = Html::parse_document(body);

    let title = html::title(&doc).unwrap_or_else(|| page_url.host_str().unwrap_or("Untitled").to_string());
    let links = html::links(&doc, page_url);
    let content = markdown::convert(&doc);
    let media = media::find_media(&doc, body, page_url)
        .into_iter()
        .map(DiscoveredMedia::new)
        .collect::<Vec<_>>();

    ::log::debug!(
        "Extracted {} links and {} media candidates from {}",
        links.len(),
        media.len(),
        page_url
    );

    PageExtract {
        title,
        content,
        links,
        media,
    }
}
