use crate::config::CrawlConfig;
use crate::crawlers::{CrawlReport, Crawler, PageSink};
use crate::fetch::{Fetch, FetchError, FetchedPage};
use crate::media::MediaKind;
use crate::normalize::{normalize, same_origin};
use crate::results::PageResult;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

enum Response {
    Html(String),
    Timeout,
    Status(u16),
}

/// In-memory web keyed by absolute address, recording every fetch
#[derive(Default)]
struct FakeWeb {
    pages: HashMap<String, Response>,
    fetched: Mutex<Vec<String>>,
}

impl FakeWeb {
    fn page(mut self, url: &str, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), Response::Html(body.to_string()));
        self
    }

    fn failing(mut self, url: &str, response: Response) -> Self {
        self.pages.insert(url.to_string(), response);
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for FakeWeb {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.pages.get(url.as_str()) {
            Some(Response::Html(body)) => Ok(FetchedPage {
                final_url: url.clone(),
                status: 200,
                body: body.clone(),
            }),
            Some(Response::Timeout) => Err(FetchError::Timeout(Duration::from_secs(30))),
            Some(Response::Status(code)) => Err(FetchError::Status(*code)),
            None => Err(FetchError::Status(404)),
        }
    }
}

fn links(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|h| format!(r#"<a href="{}">{}</a>"#, h, h))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}

fn config(max_depth: usize, link_cap: usize) -> CrawlConfig {
    CrawlConfig {
        max_depth,
        link_cap,
        delay_ms: 0,
        ..CrawlConfig::default()
    }
}

fn seeds(raw: &[&str]) -> Vec<Url> {
    raw.iter().map(|s| normalize(s, None).unwrap()).collect()
}

async fn crawl(web: &FakeWeb, config: &CrawlConfig, raw_seeds: &[&str]) -> (CrawlReport, Vec<PageResult>) {
    let mut pages: Vec<PageResult> = Vec::new();
    let report = Crawler::new(web, config)
        .run(&seeds(raw_seeds), &mut pages)
        .await;
    (report, pages)
}

#[tokio::test]
async fn test_equivalent_seeds_fetched_once() {
    let web = FakeWeb::default().page("https://example.com/", "<p>home</p>");

    let (report, pages) = crawl(
        &web,
        &config(1, 20),
        &["example.com", "https://example.com/#intro", "HTTPS://EXAMPLE.COM"],
    )
    .await;

    assert_eq!(web.fetched(), vec!["https://example.com/"]);
    assert_eq!(report.visited, 1);
    assert_eq!(pages.len(), 1);
}

#[tokio::test]
async fn test_depth_bound() {
    let web = FakeWeb::default()
        .page("https://example.com/", &links(&["/a"]))
        .page("https://example.com/a", &links(&["/b"]))
        .page("https://example.com/b", &links(&["/c"]))
        .page("https://example.com/c", &links(&[]));

    let (report, pages) = crawl(&web, &config(2, 20), &["https://example.com/"]).await;

    assert_eq!(
        web.fetched(),
        vec![
            "https://example.com/",
            "https://example.com/a",
            "https://example.com/b",
        ]
    );
    assert!(pages.iter().all(|p| p.depth <= 2));
    assert_eq!(report.visited, 3);
}

#[tokio::test]
async fn test_depth_zero_fetches_only_seeds() {
    let web = FakeWeb::default().page("https://example.com/", &links(&["/a", "/b"]));

    let (_, pages) = crawl(&web, &config(0, 20), &["https://example.com/"]).await;

    assert_eq!(web.fetched(), vec!["https://example.com/"]);
    // links are still reported even though none are followed
    assert_eq!(pages[0].links.len(), 2);
}

#[tokio::test]
async fn test_only_same_origin_followed() {
    let web = FakeWeb::default()
        .page(
            "https://example.com/",
            &links(&["https://other.org/x", "/a", "http://example.com/insecure"]),
        )
        .page("https://example.com/a", &links(&["https://other.org/y"]))
        .page("https://other.org/start", &links(&[]));

    let (_, pages) = crawl(
        &web,
        &config(3, 20),
        &["https://example.com/", "https://other.org/start"],
    )
    .await;

    assert_eq!(
        web.fetched(),
        vec![
            "https://example.com/",
            "https://example.com/a",
            "https://other.org/start",
        ]
    );

    // every page beyond depth 0 shares the origin of some page one level up
    for page in pages.iter().filter(|p| p.depth > 0) {
        assert!(pages.iter().any(|parent| parent.depth == page.depth - 1
            && same_origin(&parent.url, &page.url)
            && parent.links.contains(&page.url)));
    }
}

#[tokio::test]
async fn test_timeout_recorded_and_crawl_continues() {
    let web = FakeWeb::default()
        .failing("https://slow.example.com/", Response::Timeout)
        .failing("https://broken.example.com/", Response::Status(500))
        .page("https://example.com/", "<p>fine</p>");

    let (report, pages) = crawl(
        &web,
        &config(1, 20),
        &[
            "https://slow.example.com/",
            "https://broken.example.com/",
            "https://example.com/",
        ],
    )
    .await;

    assert_eq!(web.fetched().len(), 3);
    assert_eq!(report.failed, 2);
    assert_eq!(report.succeeded, 1);

    assert!(!pages[0].success);
    assert_eq!(pages[0].title, "slow.example.com");
    assert!(pages[0].content.contains("timed out"));
    assert!(!pages[1].success);
    assert!(pages[1].content.contains("HTTP 500"));
    assert!(pages[2].success);
}

#[tokio::test]
async fn test_link_cap_limits_followed_links() {
    let web = FakeWeb::default()
        .page(
            "https://example.com/",
            &links(&["/1", "/2", "/3", "/4", "/5"]),
        )
        .page("https://example.com/1", "")
        .page("https://example.com/2", "");

    let (_, pages) = crawl(&web, &config(1, 2), &["https://example.com/"]).await;

    assert_eq!(
        web.fetched(),
        vec![
            "https://example.com/",
            "https://example.com/1",
            "https://example.com/2",
        ]
    );
    assert_eq!(pages[0].links.len(), 5);
}

#[tokio::test]
async fn test_cycles_never_refetch() {
    let web = FakeWeb::default()
        .page("https://example.com/a", &links(&["/b", "/a", "/a#self"]))
        .page("https://example.com/b", &links(&["/a", "/c"]))
        .page("https://example.com/c", &links(&["/a", "/b"]));

    let (report, _) = crawl(&web, &config(5, 20), &["https://example.com/a"]).await;

    let fetched = web.fetched();
    let distinct: HashSet<&String> = fetched.iter().collect();
    assert_eq!(distinct.len(), fetched.len());
    assert_eq!(report.visited, fetched.len());
    assert_eq!(fetched.len(), 3);
}

#[tokio::test]
async fn test_depth_first_order() {
    let web = FakeWeb::default()
        .page("https://example.com/", &links(&["/a", "/b"]))
        .page("https://example.com/a", &links(&["/a1"]))
        .page("https://example.com/a1", "")
        .page("https://example.com/b", "");

    crawl(&web, &config(2, 20), &["https://example.com/"]).await;

    assert_eq!(
        web.fetched(),
        vec![
            "https://example.com/",
            "https://example.com/a",
            "https://example.com/a1",
            "https://example.com/b",
        ]
    );
}

#[tokio::test]
async fn test_media_links_reported_not_fetched_and_deduplicated() {
    let video_page = r#"<body>
        <video src="/v/intro.mp4"></video>
        <a href="/v/intro.mp4">Download</a>
        <a href="/more">More</a>
    </body>"#;
    let more_page = r#"<body><video src="https://example.com/v/intro.mp4"></video>
        <script>load("https://cdn.example.com/live/index.m3u8")</script></body>"#;
    let web = FakeWeb::default()
        .page("https://example.com/", video_page)
        .page("https://example.com/more", more_page);

    let (report, pages) = crawl(&web, &config(1, 20), &["https://example.com/"]).await;

    assert_eq!(
        web.fetched(),
        vec!["https://example.com/", "https://example.com/more"]
    );

    assert_eq!(report.media.len(), 2);
    assert_eq!(report.media[0].address, "https://example.com/v/intro.mp4");
    assert_eq!(report.media[0].found_on, "https://example.com/");
    assert_eq!(report.media[0].depth, 0);
    assert_eq!(report.media[0].kind, MediaKind::DirectFile);
    assert_eq!(report.media[1].kind, MediaKind::StreamingManifest);
    assert_eq!(report.media[1].found_on, "https://example.com/more");

    // the page still lists everything it contained
    assert_eq!(pages[1].media.len(), 2);
}

struct FailingSink {
    attempts: usize,
}

impl PageSink for FailingSink {
    fn record(&mut self, _page: &PageResult) -> io::Result<()> {
        self.attempts += 1;
        Err(io::Error::other("disk full"))
    }
}

#[tokio::test]
async fn test_write_failures_do_not_abort() {
    let web = FakeWeb::default()
        .page("https://example.com/", &links(&["/a"]))
        .page("https://example.com/a", "");

    let mut sink = FailingSink { attempts: 0 };
    let report = Crawler::new(&web, &config(1, 20))
        .run(&seeds(&["https://example.com/"]), &mut sink)
        .await;

    assert_eq!(sink.attempts, 2);
    assert_eq!(report.write_failures, 2);
    assert_eq!(report.visited, 2);
}

#[tokio::test]
async fn test_politeness_delay_between_fetches() {
    let web = FakeWeb::default()
        .page("https://example.com/", &links(&["/a"]))
        .page("https://example.com/a", "");
    let config = CrawlConfig {
        delay_ms: 50,
        ..config(1, 20)
    };

    let started = std::time::Instant::now();
    crawl(&web, &config, &["https://example.com/"]).await;

    assert!(started.elapsed() >= Duration::from_millis(50));
}
