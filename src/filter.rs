use crate::media::MediaKind;
use crate::normalize::{is_crawlable, same_origin};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Static assets that are never fetched as pages
static ASSET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$")
        .expect("asset pattern is valid")
});

/// Decides which links discovered on a page are followed one level deeper
#[derive(Debug, Clone)]
pub struct LinkScope {
    link_cap: usize,
}

impl LinkScope {
    /// `link_cap` bounds how many links of a single page are followed
    pub fn new(link_cap: usize) -> Self {
        Self { link_cap }
    }

    /// Determine if a link found on `page` may be followed
    pub fn should_follow(&self, link: &Url, page: &Url) -> bool {
        if !is_crawlable(link) {
            return false;
        }

        if !same_origin(link, page) {
            return false;
        }

        // Media and static assets are reported, not crawled
        if MediaKind::classify(link.as_str()) != MediaKind::Unknown {
            return false;
        }
        !ASSET_PATTERN.is_match(link.path())
    }

    /// The bounded prefix of followable links, in discovery order
    pub fn select(&self, page: &Url, links: &[Url]) -> Vec<Url> {
        links
            .iter()
            .filter(|link| self.should_follow(link, page))
            .take(self.link_cap)
            .cloned()
            .collect()
    }
}
