use crate::config::CrawlConfig;
use crate::crawlers::crawler::{CrawlReport, PageSink};
use crate::fetch::Fetch;
use crate::filter::LinkScope;
use crate::media::MediaReference;
use crate::parsers;
use crate::results::PageResult;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Mutable state of one crawl run.
///
/// The visited set only grows; an address in it is never fetched again.
#[derive(Debug, Default)]
pub struct CrawlSession {
    visited: HashSet<String>,
    media_seen: HashSet<String>,
    report: CrawlReport,
}

impl CrawlSession {
    /// Marks `url` visited, returning false if it already was
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Adds the page's media not seen earlier in the run, returning how many were new
    pub fn record_media(&mut self, page: &PageResult) -> usize {
        let mut added = 0;
        for media in &page.media {
            if self.media_seen.insert(media.address.clone()) {
                self.report
                    .media
                    .push(MediaReference::new(media, page.url.as_str(), page.depth));
                added += 1;
            }
        }
        added
    }

    fn record_outcome(&mut self, page: &PageResult) {
        if page.success {
            self.report.succeeded += 1;
        } else {
            self.report.failed += 1;
        }
    }

    pub fn into_report(mut self) -> CrawlReport {
        self.report.visited = self.visited.len();
        self.report
    }
}

/// Sequential depth-first crawler.
///
/// One fetch is in flight at a time. Each seed is crawled to completion
/// before the next one starts, with links held on an explicit stack of
/// `(address, depth)` pairs.
pub struct Crawler<'a> {
    fetcher: &'a dyn Fetch,
    scope: LinkScope,
    max_depth: usize,
    delay: Duration,
}

impl<'a> Crawler<'a> {
    pub fn new(fetcher: &'a dyn Fetch, config: &CrawlConfig) -> Self {
        Self {
            fetcher,
            scope: LinkScope::new(config.link_cap),
            max_depth: config.max_depth,
            delay: config.delay(),
        }
    }

    /// Crawl every seed, handing each page to `sink` as soon as it is done
    pub async fn run(&self, seeds: &[Url], sink: &mut dyn PageSink) -> CrawlReport {
        let mut session = CrawlSession::default();

        for seed in seeds {
            self.crawl_seed(seed, &mut session, sink).await;
        }

        let report = session.into_report();
        ::log::info!(
            "Crawl finished: {} addresses visited, {} failed, {} media found",
            report.visited,
            report.failed,
            report.media.len()
        );
        report
    }

    async fn crawl_seed(&self, seed: &Url, session: &mut CrawlSession, sink: &mut dyn PageSink) {
        let mut worklist: Vec<(Url, usize)> = vec![(seed.clone(), 0)];

        while let Some((url, depth)) = worklist.pop() {
            if !session.mark_visited(&url) {
                ::log::debug!("Skipping already visited: {}", url);
                continue;
            }

            // Politeness delay between consecutive fetches
            if session.visited_count() > 1 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            let page = self.visit(&url, depth).await;
            session.record_outcome(&page);

            let new_media = session.record_media(&page);
            if new_media > 0 {
                ::log::info!("{}Found {} new media on {}", indent(depth + 1), new_media, url);
            }

            if let Err(e) = sink.record(&page) {
                ::log::error!("Failed to write result for {}: {}", url, e);
                session.report.write_failures += 1;
            }

            if !page.success || depth >= self.max_depth {
                continue;
            }

            let next = self.scope.select(&url, &page.links);
            ::log::debug!(
                "Following {} of {} links from {}",
                next.len(),
                page.links.len(),
                url
            );

            // Reversed so the first link is popped first
            for link in next.into_iter().rev() {
                if !session.is_visited(&link) {
                    worklist.push((link, depth + 1));
                }
            }
        }
    }

    async fn visit(&self, url: &Url, depth: usize) -> PageResult {
        ::log::info!("{}Scanning: {}", indent(depth), url);

        match self.fetcher.fetch(url).await {
            Ok(fetched) => {
                let extract = parsers::extract(&fetched.body, &fetched.final_url);
                PageResult::extracted(
                    url.clone(),
                    extract.title,
                    extract.content,
                    extract.links,
                    extract.media,
                    depth,
                )
            }
            Err(e) => {
                ::log::warn!("{}Error scanning {}: {}", indent(depth), url, e);
                PageResult::failed(url.clone(), depth, &e)
            }
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
