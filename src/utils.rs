use chrono::{DateTime, Local};

/// Longest file-name stem produced by [`sanitize_filename`]
const MAX_STEM_CHARS: usize = 100;

/// Convert a page title to something usable as a file name
pub fn sanitize_filename(title: &str) -> String {
    let mut name = String::with_capacity(title.len());
    let mut in_whitespace = false;

    for c in title.trim().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => name.push('_'),
            c if c.is_control() => {}
            c => name.push(c),
        }
    }

    let name: String = name.chars().take(MAX_STEM_CHARS).collect();
    if name.is_empty() {
        "untitled".to_string()
    } else {
        name
    }
}

/// File name of the `index`-th page written in a run
pub fn page_file_name(index: usize, title: &str) -> String {
    format!("{:03}_{}.md", index, sanitize_filename(title))
}

/// Name of the directory holding one run's output
pub fn run_dir_name(started: &DateTime<Local>) -> String {
    format!("media_crawl_{}", started.format("%Y%m%d_%H%M%S"))
}

/// Timestamp format used inside output files
pub fn display_time(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}
