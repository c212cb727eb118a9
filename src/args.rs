use clap::Parser;
use media_crawl::CrawlConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "media-crawl")]
#[command(about = "Crawls websites depth-first and reports the media addresses they reference")]
#[command(version)]
pub struct Args {
    /// Seed addresses; bare domains get https:// prepended
    pub seeds: Vec<String>,

    /// Read seeds from a file, one per line ('#' starts a comment)
    #[arg(short = 'f', long)]
    pub seed_file: Option<PathBuf>,

    /// JSON configuration file; flags given here override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum recursion depth (seeds are depth 0)
    #[arg(short = 'd', long)]
    pub max_depth: Option<usize>,

    /// Same-origin links followed per page
    #[arg(short, long)]
    pub link_cap: Option<usize>,

    /// Pause between fetches in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Directory in which the run directory is created
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render pages through this WebDriver server (e.g. http://localhost:4444)
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver: Option<String>,
}

impl Args {
    /// Load the base configuration and apply command-line overrides
    pub fn to_config(&self) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::default(),
        };

        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(link_cap) = self.link_cap {
            config.link_cap = link_cap;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(webdriver) = self.webdriver.as_ref().filter(|w| !w.is_empty()) {
            config.webdriver_url = Some(webdriver.clone());
        }
        if let Some(seed_file) = &self.seed_file {
            config.seed_file = Some(seed_file.clone());
        }

        Ok(config)
    }
}
