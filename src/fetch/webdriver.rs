use crate::fetch::{Fetch, FetchError, FetchedPage};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// Common local WebDriver endpoints tried when the configured one is down
const FALLBACK_URLS: &[&str] = &[
    "http://localhost:4444",
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444",
];

/// Fetches the rendered page source through a WebDriver session.
///
/// Addresses assembled by scripts at runtime only show up in the rendered
/// markup, so this mode finds media a plain GET misses. The session is
/// opened on first use and dropped when it is lost.
pub struct WebDriverFetcher {
    webdriver_url: String,
    fallback_urls: Vec<String>,
    timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: &str, timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.to_string(),
            fallback_urls: FALLBACK_URLS.iter().map(|u| u.to_string()).collect(),
            timeout,
            client: Mutex::new(None),
        }
    }

    /// Replace the endpoints tried after the configured one fails
    pub fn with_fallbacks(mut self, urls: &[&str]) -> Self {
        self.fallback_urls = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    /// Returns the live session, connecting when there is none
    async fn session(&self) -> Result<Client, FetchError> {
        let mut slot = self.client.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = self.connect().await?;
        *slot = Some(client.clone());
        Ok(client)
    }

    async fn connect(&self) -> Result<Client, FetchError> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in &self.fallback_urls {
            if *url == self.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        Err(FetchError::WebDriver(format!(
            "no WebDriver server reachable at {} (set --webdriver to a running server)",
            self.webdriver_url
        )))
    }

    async fn forget_session(&self) {
        let mut slot = self.client.lock().await;
        *slot = None;
    }

    async fn render(client: &Client, url: &Url) -> Result<FetchedPage, fantoccini::error::CmdError> {
        client.goto(url.as_str()).await?;
        let body = client.source().await?;
        let final_url = client.current_url().await?;

        Ok(FetchedPage {
            final_url,
            // WebDriver does not expose the response status
            status: 200,
            body,
        })
    }
}

#[async_trait]
impl Fetch for WebDriverFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let client = self.session().await?;

        match timeout(self.timeout, Self::render(&client, url)).await {
            Ok(Ok(page)) => {
                ::log::debug!("Rendered {} ({} bytes)", page.final_url, page.body.len());
                Ok(page)
            }
            Ok(Err(e)) => {
                let message = e.to_string();
                if message.contains("Unable to find session") || message.contains("invalid session") {
                    ::log::warn!("Lost WebDriver session while loading {}", url);
                    self.forget_session().await;
                }
                Err(FetchError::WebDriver(message))
            }
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    async fn shutdown(&self) {
        let client = self.client.lock().await.take();
        if let Some(client) = client {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }
}
