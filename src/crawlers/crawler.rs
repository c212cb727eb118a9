use crate::media::MediaReference;
use crate::results::PageResult;
use std::io;

/// Receives every page result as soon as it is produced
pub trait PageSink {
    /// Persist or otherwise consume one page
    fn record(&mut self, page: &PageResult) -> io::Result<()>;
}

/// Pages are only kept in memory, mostly useful in tests
impl PageSink for Vec<PageResult> {
    fn record(&mut self, page: &PageResult) -> io::Result<()> {
        self.push(page.clone());
        Ok(())
    }
}

/// Totals of a finished crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Distinct addresses fetched
    pub visited: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Pages the sink failed to record
    pub write_failures: usize,
    /// Run-level media list, one entry per distinct address
    pub media: Vec<MediaReference>,
}
