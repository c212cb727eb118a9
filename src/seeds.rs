use crate::normalize::normalize;
use regex::Regex;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::LazyLock;
use url::Url;

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[.*?\]\((https?://[^)\s]+)\)").expect("markdown link pattern is valid")
});

/// Parse seed addresses from the contents of a seed file.
///
/// Each line is a bare address, a markdown `[text](address)` link, a bare
/// domain, a `#` comment or blank. Anything else is logged and skipped.
pub fn parse_seed_lines(contents: &str) -> Vec<Url> {
    let mut seeds = Vec::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let candidate = MARKDOWN_LINK
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map_or(line, |m| m.as_str());

        match normalize(candidate, None) {
            Ok(url) => seeds.push(url),
            Err(e) => {
                let preview: String = line.chars().take(50).collect();
                ::log::warn!("Skipping non-URL line '{}': {}", preview, e);
            }
        }
    }

    seeds
}

/// Read seed addresses from a file
pub fn read_seed_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<Url>> {
    let contents = fs::read_to_string(path.as_ref())?;
    let seeds = parse_seed_lines(&contents);
    ::log::info!(
        "Loaded {} seed addresses from {}",
        seeds.len(),
        path.as_ref().display()
    );
    Ok(seeds)
}

/// Prompt for seed addresses line by line.
///
/// A blank line ends entry once at least one address was accepted;
/// `file <path>` loads a seed file instead. End of input returns whatever
/// was collected so far.
pub fn read_interactive<R: BufRead, W: Write>(input: R, mut out: W) -> io::Result<Vec<Url>> {
    let mut seeds = Vec::new();

    writeln!(out, "Enter addresses to scan, one per line.")?;
    writeln!(
        out,
        "Press Enter on an empty line when done, or type 'file <path>' to load a seed file."
    )?;

    let mut lines = input.lines();
    loop {
        write!(out, "URL: ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let entry = line.trim();

        if entry.is_empty() {
            if seeds.is_empty() {
                writeln!(out, "Please enter at least one address.")?;
                continue;
            }
            break;
        }

        if let Some(path) = entry.strip_prefix("file ") {
            match read_seed_file(path.trim()) {
                Ok(from_file) => return Ok(from_file),
                Err(e) => writeln!(out, "Could not read seed file {}: {}", path.trim(), e)?,
            }
            continue;
        }

        match normalize(entry, None) {
            Ok(url) => {
                writeln!(out, "Added: {}", url)?;
                seeds.push(url);
            }
            Err(e) => writeln!(out, "Invalid address: {}", e)?,
        }
    }

    Ok(seeds)
}
