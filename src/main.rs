use clap::Parser;
use media_crawl::normalize::normalize;
use media_crawl::{MediaCrawl, MediaKind, seeds};
use std::collections::BTreeMap;
use std::io;
use std::process::ExitCode;
use url::Url;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Default to info so progress is visible without RUST_LOG
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let seed_urls = match gather_seeds(&args.seeds, config.seed_file.as_deref()) {
        Ok(seeds) => seeds,
        Err(e) => {
            ::log::error!("Failed to read seeds: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if seed_urls.is_empty() {
        println!("No URLs provided.");
        return ExitCode::FAILURE;
    }

    ::log::info!(
        "Starting crawl of {} seed(s): max depth {}, {} links per page, {}ms delay",
        seed_urls.len(),
        config.max_depth,
        config.link_cap,
        config.delay_ms
    );

    let start_time = std::time::Instant::now();
    let summary = match MediaCrawl::from_config(config).run(&seed_urls).await {
        Ok(summary) => summary,
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = &summary.report;
    let mut by_kind: BTreeMap<MediaKind, usize> = BTreeMap::new();
    for media in &report.media {
        *by_kind.entry(media.kind).or_default() += 1;
    }

    println!();
    println!(
        "Visited {} addresses ({} failed) in {:.2} seconds",
        report.visited,
        report.failed,
        start_time.elapsed().as_secs_f64()
    );
    println!("Found {} media links", report.media.len());
    for (kind, count) in by_kind {
        println!("  {}: {}", kind, count);
    }
    if report.write_failures > 0 {
        println!("{} page files could not be written", report.write_failures);
    }
    println!("Results saved to: {}", summary.output_dir.display());

    ExitCode::SUCCESS
}

/// Seeds from the command line and seed file, or typed in when neither gave any
fn gather_seeds(raw: &[String], seed_file: Option<&std::path::Path>) -> io::Result<Vec<Url>> {
    let mut urls = Vec::new();

    for input in raw {
        match normalize(input, None) {
            Ok(url) => urls.push(url),
            Err(e) => ::log::warn!("Skipping seed '{}': {}", input, e),
        }
    }

    if let Some(path) = seed_file {
        urls.extend(seeds::read_seed_file(path)?);
    }

    if raw.is_empty() && seed_file.is_none() {
        urls = seeds::read_interactive(io::stdin().lock(), io::stdout())?;
    }

    Ok(urls)
}
