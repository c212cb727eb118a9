pub mod crawler;
pub mod session;

#[cfg(test)]
mod tests;

pub use crawler::{CrawlReport, PageSink};
pub use session::{CrawlSession, Crawler};
