use crate::media::DiscoveredMedia;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use url::Url;

/// Outcome of one fetch attempt, written out once and then dropped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Address that was fetched
    pub url: Url,

    /// Page title, or the host when the page has none
    pub title: String,

    /// Body converted to markdown, or the error message on failure
    pub content: String,

    /// Outbound links in discovery order
    pub links: Vec<Url>,

    /// Media addresses found on this page
    pub media: Vec<DiscoveredMedia>,

    pub depth: usize,
    pub success: bool,
    pub visited_at: DateTime<Local>,
}

impl PageResult {
    /// Create a result for a page that was fetched and extracted
    pub fn extracted(
        url: Url,
        title: String,
        content: String,
        links: Vec<Url>,
        media: Vec<DiscoveredMedia>,
        depth: usize,
    ) -> Self {
        Self {
            url,
            title,
            content,
            links,
            media,
            depth,
            success: true,
            visited_at: Local::now(),
        }
    }

    /// Create a result for a fetch that failed
    pub fn failed(url: Url, depth: usize, error: &dyn std::error::Error) -> Self {
        let title = url.host_str().unwrap_or("Error").to_string();
        Self {
            content: format!("Error scraping content: {}", error),
            url,
            title,
            links: Vec::new(),
            media: Vec::new(),
            depth,
            success: false,
            visited_at: Local::now(),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.success { "Success" } else { "Error" }
    }
}
