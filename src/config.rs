use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Browser-like User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Configuration for a crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Maximum recursion depth (seeds are depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// How many same-origin links of a page are followed
    #[serde(default = "default_link_cap")]
    pub link_cap: usize,

    /// Pause between two consecutive fetches, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header for outbound requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory in which the timestamped run directory is created
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// How many links are listed in each per-page file
    #[serde(default = "default_listed_links")]
    pub listed_links: usize,

    /// Fetch pages through this WebDriver server instead of plain HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webdriver_url: Option<String>,

    /// Seed file to read addresses from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl CrawlConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            link_cap: default_link_cap(),
            delay_ms: default_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            output_dir: default_output_dir(),
            listed_links: default_listed_links(),
            webdriver_url: None,
            seed_file: None,
        }
    }
}

fn default_max_depth() -> usize {
    1
}

fn default_link_cap() -> usize {
    20
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_listed_links() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = CrawlConfig::from_json("{}").unwrap();
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.link_cap, 20);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.delay(), Duration::from_millis(1000));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.webdriver_url.is_none());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = CrawlConfig::from_json(
            r#"{"max_depth": 3, "link_cap": 5, "webdriver_url": "http://localhost:4444"}"#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.link_cap, 5);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(
            config.webdriver_url.as_deref(),
            Some("http://localhost:4444")
        );
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.json");
        std::fs::write(&path, r#"{"delay_ms": 0, "output_dir": "out"}"#).unwrap();

        let config = CrawlConfig::from_file(&path).unwrap();
        assert_eq!(config.delay_ms, 0);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(CrawlConfig::from_json("{max_depth: }").is_err());
    }
}
