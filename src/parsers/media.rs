//! Media address discovery.
//!
//! Two passes run over every page and their results are unioned: a markup
//! pass over elements and attributes, and a full-text pass over the raw body
//! that recovers addresses assembled in scripts or tucked into data
//! attributes the markup pass cannot see.

use crate::media::{DIRECT_EXTENSIONS, STREAMING_EXTENSIONS, find_extension};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Characters allowed inside an unquoted address
const ADDR: &str = r#"[^\s<>"'{}|\\^`\[\]]"#;

/// Extensions recognised by the address patterns. Each use is followed by
/// `\b` so that `.avif` or `.webmanifest` never yield `.avi` or `.webm`.
const EXT: &str = "mp4|m4v|mov|avi|mkv|wmv|flv|webm|mpeg|mpg|3gp|ogv|mp3|m4a|wav|ogg|flac|m3u8|mpd";

/// Address-shaped patterns applied to script text, attribute values and the
/// whole body. Every match is a complete address.
static ADDRESS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // direct and streaming files, with or without a query string
        format!(r"(?i)https?://{ADDR}+\.(?:{EXT})\b(?:\?{ADDR}*)?"),
        // anything following a manifest extension, e.g. signed HLS paths
        format!(r"(?i)https?://{ADDR}+\.(?:m3u8|mpd)\b{ADDR}*"),
        // conventional media paths
        format!(r"(?i)https?://{ADDR}+/(?:video|videos|stream|streams)/{ADDR}+"),
        format!(r"(?i)https?://{ADDR}+/(?:media|content)/{ADDR}+\.(?:{EXT})\b"),
        // CDN buckets
        format!(r"(?i)https?://{ADDR}+\.(?:cloudfront\.net|amazonaws\.com|akamaihd\.net)/{ADDR}+\.(?:{EXT})\b"),
        // object URLs created by players
        format!(r"(?i)blob:https?://{ADDR}+"),
        // inline base64 payloads
        r"data:(?:video|audio)/[a-zA-Z0-9.+-]+;base64,[A-Za-z0-9+/=]+".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("media pattern is valid"))
    .collect()
});

/// Quoted strings containing a media extension, absolute or relative
static QUOTED_MEDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(?i)["']([^"'\s<>]+\.(?:{EXT})\b[^"'\s<>]*)["']"#))
        .expect("quoted media pattern is valid")
});

/// Any absolute http(s) address, checked afterwards for media extensions
static ANY_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"https?://{ADDR}+")).expect("address pattern is valid")
});

static PLAYER_ELEMENTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("video, audio, source, track").expect("player selector is valid")
});
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));
static IFRAMES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe[src]").expect("iframe selector is valid"));
static SCRIPTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("script selector is valid"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("meta selector is valid"));
static ALL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("*").expect("universal selector is valid"));

/// Source attributes used by players and lazy loaders
const SOURCE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-source", "data-video-src"];

/// Attribute names that hint at a media value
const MEDIA_ATTRIBUTE_HINTS: &[&str] = &["video", "media", "src", "source", "file", "url"];

/// Iframe sources that look like embedded players
const PLAYER_HINTS: &[&str] = &["youtube", "vimeo", "dailymotion", "video", "player", "embed"];

/// Insertion-ordered set of raw candidates
#[derive(Default)]
struct Candidates {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl Candidates {
    fn add(&mut self, candidate: &str) {
        let candidate = candidate.trim();
        if candidate.is_empty() || candidate.contains(char::is_whitespace) {
            return;
        }
        if candidate.contains('<') || candidate.contains('>') {
            return;
        }
        if self.seen.insert(candidate.to_string()) {
            self.items.push(candidate.to_string());
        }
    }

    fn add_patterns(&mut self, text: &str) {
        for pattern in ADDRESS_PATTERNS.iter() {
            for m in pattern.find_iter(text) {
                self.add(m.as_str());
            }
        }
    }
}

fn has_media_extension(value: &str) -> bool {
    find_extension(value, DIRECT_EXTENSIONS).is_some()
        || find_extension(value, STREAMING_EXTENSIONS).is_some()
}

/// All media addresses found on a page, absolute and deduplicated.
///
/// `data:` and `blob:` addresses are kept verbatim; everything else is
/// resolved against `page_url` and kept only when it is http(s).
pub fn find_media(doc: &Html, body: &str, page_url: &Url) -> Vec<String> {
    let mut candidates = Candidates::default();
    markup_pass(doc, &mut candidates);
    text_pass(body, &mut candidates);

    let mut seen = HashSet::new();
    candidates
        .items
        .into_iter()
        .filter_map(|candidate| absolutize(&candidate, page_url))
        .filter(|address| seen.insert(address.clone()))
        .collect()
}

fn absolutize(candidate: &str, page_url: &Url) -> Option<String> {
    if candidate.starts_with("data:") || candidate.starts_with("blob:") {
        return Some(candidate.to_string());
    }

    // Escaped slashes from JSON embedded in scripts
    let candidate = candidate.replace("\\/", "/");
    match page_url.join(&candidate) {
        Ok(mut url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            url.set_fragment(None);
            Some(url.to_string())
        }
        Ok(_) => None,
        Err(e) => {
            ::log::trace!("Dropping media candidate '{}': {}", candidate, e);
            None
        }
    }
}

fn markup_pass(doc: &Html, out: &mut Candidates) {
    for element in doc.select(&PLAYER_ELEMENTS) {
        for attr in SOURCE_ATTRIBUTES {
            if let Some(value) = element.value().attr(attr) {
                out.add(value);
            }
        }
    }

    for anchor in doc.select(&ANCHORS) {
        if let Some(href) = anchor.value().attr("href") {
            if has_media_extension(href) {
                out.add(href);
            }
        }
    }

    for iframe in doc.select(&IFRAMES) {
        if let Some(src) = iframe.value().attr("src") {
            let lowered = src.to_ascii_lowercase();
            if PLAYER_HINTS.iter().any(|hint| lowered.contains(hint)) {
                out.add(src);
            }
        }
    }

    for script in doc.select(&SCRIPTS) {
        let text = script.text().collect::<String>();
        if !text.trim().is_empty() {
            out.add_patterns(&text);
        }
    }

    for meta in doc.select(&META) {
        if let Some(content) = meta.value().attr("content") {
            if has_media_extension(content) {
                out.add(content);
            }
        }
    }

    // Every attribute of every element, style included
    for element in doc.select(&ALL) {
        for (name, value) in element.value().attrs() {
            let name = name.to_ascii_lowercase();
            if MEDIA_ATTRIBUTE_HINTS.iter().any(|hint| name.contains(hint))
                && has_media_extension(value)
            {
                out.add(value);
            }
            out.add_patterns(value);
        }
    }
}

fn text_pass(body: &str, out: &mut Candidates) {
    out.add_patterns(body);

    for caps in QUOTED_MEDIA.captures_iter(body) {
        if let Some(m) = caps.get(1) {
            out.add(m.as_str());
        }
    }

    for m in ANY_ADDRESS.find_iter(body) {
        if has_media_extension(m.as_str()) {
            out.add(m.as_str());
        }
    }
}
