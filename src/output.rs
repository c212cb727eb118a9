use crate::crawlers::{CrawlReport, PageSink};
use crate::media::{MediaKind, MediaReference};
use crate::results::PageResult;
use crate::utils::{display_time, page_file_name, run_dir_name};
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MANIFEST_TEXT: &str = "media_links.txt";
pub const MANIFEST_JSON: &str = "media_links.json";
pub const MANIFEST_CSV: &str = "media_links.csv";
pub const SUMMARY: &str = "summary.txt";

/// Timestamped directory holding everything one run writes
pub struct RunOutput {
    dir: PathBuf,
    listed_links: usize,
    pages_written: usize,
}

impl RunOutput {
    /// Create a fresh `<parent>/media_crawl_<timestamp>` directory.
    ///
    /// A run started in the same second as an earlier one gets a numeric
    /// suffix instead of reusing its directory.
    pub fn create(parent: &Path, listed_links: usize) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        let dir = create_unique_dir(parent, &run_dir_name(&Local::now()))?;
        ::log::info!("Output directory: {}", dir.display());

        Ok(Self {
            dir,
            listed_links,
            pages_written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pages_written(&self) -> usize {
        self.pages_written
    }

    /// Write the run-level manifests and summary.
    ///
    /// Every file is attempted; the first error is returned afterwards.
    pub fn finish(&self, report: &CrawlReport) -> io::Result<()> {
        let results = [
            rendered(|out| render_manifest(out, &report.media))
                .and_then(|text| fs::write(self.dir.join(MANIFEST_TEXT), text)),
            serde_json::to_string_pretty(&report.media)
                .map_err(io::Error::other)
                .and_then(|json| fs::write(self.dir.join(MANIFEST_JSON), json)),
            render_csv(&report.media)
                .map_err(io::Error::from)
                .and_then(|csv| fs::write(self.dir.join(MANIFEST_CSV), csv)),
            rendered(|out| render_summary(out, report))
                .and_then(|text| fs::write(self.dir.join(SUMMARY), text)),
        ];

        let mut first_error = None;
        for result in results {
            if let Err(e) = result {
                ::log::error!("Failed to write run file in {}: {}", self.dir.display(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl PageSink for RunOutput {
    fn record(&mut self, page: &PageResult) -> io::Result<()> {
        let path = self
            .dir
            .join(page_file_name(self.pages_written + 1, &page.title));
        let text = rendered(|out| render_page(out, page, self.listed_links))?;
        fs::write(&path, text)?;

        self.pages_written += 1;
        ::log::debug!("Saved: {}", path.display());
        Ok(())
    }
}

fn create_unique_dir(parent: &Path, name: &str) -> io::Result<PathBuf> {
    let mut attempt = 0;
    loop {
        let dir = match attempt {
            0 => parent.join(name),
            n => parent.join(format!("{}_{}", name, n)),
        };
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

fn rendered(render: impl FnOnce(&mut String) -> fmt::Result) -> io::Result<String> {
    let mut out = String::new();
    render(&mut out).map_err(io::Error::other)?;
    Ok(out)
}

/// Markdown document for one visited page
pub fn render_page(
    out: &mut impl fmt::Write,
    page: &PageResult,
    listed_links: usize,
) -> fmt::Result {
    writeln!(out, "# {}\n", page.title)?;
    writeln!(out, "**Source URL:** {}  ", page.url)?;
    writeln!(out, "**Scraped on:** {}  ", display_time(&page.visited_at))?;
    writeln!(out, "**Status:** {}  ", page.status_label())?;
    writeln!(out, "**Depth:** {}\n", page.depth)?;
    writeln!(out, "---\n")?;
    writeln!(out, "{}\n", page.content.trim_end())?;

    if !page.links.is_empty() {
        writeln!(out, "## Links ({})\n", page.links.len())?;
        for link in page.links.iter().take(listed_links) {
            writeln!(out, "- {}", link)?;
        }
        if page.links.len() > listed_links {
            writeln!(out, "- ... and {} more", page.links.len() - listed_links)?;
        }
        writeln!(out)?;
    }

    if !page.media.is_empty() {
        writeln!(out, "## Media ({})\n", page.media.len())?;
        for media in &page.media {
            writeln!(out, "- [{}] {}", media.kind, media.address)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Media grouped by the page they were found on, in discovery order
pub fn render_manifest(out: &mut impl fmt::Write, media: &[MediaReference]) -> fmt::Result {
    writeln!(out, "Media Links Found - {}", display_time(&Local::now()))?;
    writeln!(out, "{}\n", "=".repeat(60))?;

    let mut sources: Vec<&str> = Vec::new();
    let mut by_source: BTreeMap<&str, Vec<&MediaReference>> = BTreeMap::new();
    for reference in media {
        let entry = by_source.entry(reference.found_on.as_str()).or_default();
        if entry.is_empty() {
            sources.push(reference.found_on.as_str());
        }
        entry.push(reference);
    }

    for source in sources {
        writeln!(out, "\nSource: {}", source)?;
        writeln!(out, "{}", "-".repeat(40))?;
        for reference in &by_source[source] {
            writeln!(out, "{}", reference.address)?;
        }
    }

    Ok(())
}

/// One line of `media_links.csv`
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Media URL")]
    address: &'a str,
    #[serde(rename = "Found On")]
    found_on: &'a str,
    #[serde(rename = "Type")]
    kind: MediaKind,
    #[serde(rename = "Depth")]
    depth: usize,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

pub fn render_csv(media: &[MediaReference]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(vec![]);
    if media.is_empty() {
        writer.write_record(["Media URL", "Found On", "Type", "Depth", "Timestamp"])?;
    }
    for reference in media {
        writer.serialize(CsvRow {
            address: &reference.address,
            found_on: &reference.found_on,
            kind: reference.kind,
            depth: reference.depth,
            timestamp: display_time(&reference.discovered_at),
        })?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(io::Error::new(e.error().kind(), e.error().to_string())))
}

pub fn render_summary(out: &mut impl fmt::Write, report: &CrawlReport) -> fmt::Result {
    let mut by_kind: BTreeMap<MediaKind, usize> = BTreeMap::new();
    for reference in &report.media {
        *by_kind.entry(reference.kind).or_default() += 1;
    }

    writeln!(out, "Media Crawl Summary - {}", display_time(&Local::now()))?;
    writeln!(out, "{}\n", "=".repeat(60))?;
    writeln!(out, "Addresses visited: {}", report.visited)?;
    writeln!(out, "Pages succeeded: {}", report.succeeded)?;
    writeln!(out, "Pages failed: {}", report.failed)?;
    writeln!(out, "Total media found: {}\n", report.media.len())?;
    writeln!(out, "Media by type:")?;
    for (kind, count) in by_kind {
        writeln!(out, "  {}: {}", kind, count)?;
    }
    Ok(())
}
