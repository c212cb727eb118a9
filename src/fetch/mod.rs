pub mod http;
pub mod webdriver;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;

use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Raw response of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Address after redirects
    pub final_url: Url,
    pub status: u16,
    pub body: String,
}

/// Why a fetch did not produce a page. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("could not build HTTP client: {0}")]
    Client(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),
}

/// Something that turns an address into markup
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;

    /// Release held resources at the end of a run
    async fn shutdown(&self) {}
}
