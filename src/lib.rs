pub mod config;
pub mod crawlers;
pub mod fetch;
pub mod filter;
pub mod media;
pub mod normalize;
pub mod output;
pub mod parsers;
pub mod results;
pub mod seeds;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::CrawlConfig;
pub use crawlers::{CrawlReport, Crawler};
pub use media::{MediaKind, MediaReference};
pub use results::PageResult;

use fetch::{Fetch, HttpFetcher, WebDriverFetcher};
use output::RunOutput;
use std::error::Error;
use std::path::{Path, PathBuf};
use url::Url;

/// Outcome of a finished run
#[derive(Debug)]
pub struct RunSummary {
    pub report: CrawlReport,
    pub output_dir: PathBuf,
    pub pages_written: usize,
}

/// Main builder for a media discovery run
pub struct MediaCrawl {
    config: CrawlConfig,
}

impl MediaCrawl {
    pub fn new() -> Self {
        Self::from_config(CrawlConfig::default())
    }

    pub fn from_config(config: CrawlConfig) -> Self {
        Self { config }
    }

    /// Replace the configuration with one loaded from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        Ok(Self::from_config(CrawlConfig::from_file(path)?))
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_link_cap(mut self, link_cap: usize) -> Self {
        self.config.link_cap = link_cap;
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.delay_ms = delay_ms;
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.timeout_secs = timeout_seconds;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Render pages through a WebDriver server instead of plain HTTP
    pub fn with_webdriver(mut self, webdriver_url: impl Into<String>) -> Self {
        self.config.webdriver_url = Some(webdriver_url.into());
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl the seeds and write every output file of the run
    pub async fn run(&self, seeds: &[Url]) -> Result<RunSummary, Box<dyn Error>> {
        let fetcher: Box<dyn Fetch> = match &self.config.webdriver_url {
            Some(webdriver_url) => {
                ::log::info!("Rendering pages through WebDriver at {}", webdriver_url);
                Box::new(WebDriverFetcher::new(webdriver_url, self.config.timeout()))
            }
            None => Box::new(HttpFetcher::new(&self.config)?),
        };

        let mut output = RunOutput::create(&self.config.output_dir, self.config.listed_links)?;

        let report = Crawler::new(fetcher.as_ref(), &self.config)
            .run(seeds, &mut output)
            .await;
        fetcher.shutdown().await;

        output.finish(&report)?;

        Ok(RunSummary {
            output_dir: output.dir().to_path_buf(),
            pages_written: output.pages_written(),
            report,
        })
    }
}

impl Default for MediaCrawl {
    fn default() -> Self {
        Self::new()
    }
}
