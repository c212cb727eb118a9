use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extensions of adaptive streaming manifests
pub const STREAMING_EXTENSIONS: &[&str] = &["m3u8", "mpd"];

/// Extensions of directly downloadable media files
pub const DIRECT_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mov", "avi", "mkv", "wmv", "flv", "webm", "mpeg", "mpg", "3gp", "ogv", "mp3",
    "m4a", "wav", "ogg", "flac",
];

/// Coarse classification of a media address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    /// `data:` address carrying the media inline
    EncodedInline,
    /// `blob:` address only meaningful inside the page that created it
    Deferred,
    /// HLS / DASH manifest
    StreamingManifest,
    /// Plain media file
    DirectFile,
    Unknown,
}

type Rule = (fn(&str) -> bool, MediaKind);

/// Evaluated top to bottom, first match wins
const RULES: &[Rule] = &[
    (is_inline, MediaKind::EncodedInline),
    (is_deferred, MediaKind::Deferred),
    (is_streaming, MediaKind::StreamingManifest),
    (is_direct, MediaKind::DirectFile),
];

fn is_inline(address: &str) -> bool {
    address.starts_with("data:")
}

fn is_deferred(address: &str) -> bool {
    address.starts_with("blob:")
}

fn is_streaming(address: &str) -> bool {
    find_extension(address, STREAMING_EXTENSIONS).is_some()
}

fn is_direct(address: &str) -> bool {
    find_extension(address, DIRECT_EXTENSIONS).is_some()
}

impl MediaKind {
    /// Classify an address by the first matching rule
    pub fn classify(address: &str) -> Self {
        let lowered = address.to_ascii_lowercase();
        RULES
            .iter()
            .find(|(matches, _)| matches(&lowered))
            .map(|(_, kind)| *kind)
            .unwrap_or(MediaKind::Unknown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::EncodedInline => "encoded-inline",
            MediaKind::Deferred => "deferred",
            MediaKind::StreamingManifest => "streaming-manifest",
            MediaKind::DirectFile => "direct-file",
            MediaKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First extension from `extensions` appearing as `.ext` in the address.
///
/// Matching is by substring so that `clip.mp4?token=..` and
/// `/hls/master.m3u8/chunk` are recognised too.
pub fn find_extension(address: &str, extensions: &[&'static str]) -> Option<&'static str> {
    let lowered = address.to_ascii_lowercase();
    extensions.iter().copied().find(|ext| {
        lowered.match_indices(ext).any(|(i, _)| {
            let after = i + ext.len();
            i > 0
                && lowered.as_bytes()[i - 1] == b'.'
                && !lowered[after..].starts_with(|c: char| c.is_ascii_alphanumeric())
        })
    })
}

/// A media address found on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredMedia {
    pub address: String,
    pub kind: MediaKind,
}

impl DiscoveredMedia {
    pub fn new(address: String) -> Self {
        let kind = MediaKind::classify(&address);
        Self { address, kind }
    }
}

/// Run-level record of a media address, kept once per distinct address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReference {
    pub address: String,
    /// Page the address was first seen on
    pub found_on: String,
    pub depth: usize,
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    pub discovered_at: DateTime<Local>,
}

impl MediaReference {
    pub fn new(media: &DiscoveredMedia, found_on: &str, depth: usize) -> Self {
        let extension = find_extension(&media.address, STREAMING_EXTENSIONS)
            .or_else(|| find_extension(&media.address, DIRECT_EXTENSIONS))
            .map(str::to_string);

        Self {
            address: media.address.clone(),
            found_on: found_on.to_string(),
            depth,
            kind: media.kind,
            extension,
            discovered_at: Local::now(),
        }
    }
}
