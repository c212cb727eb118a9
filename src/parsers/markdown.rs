use htmd::HtmlToMarkdown;
use htmd::options::{BulletListMarker, CodeBlockStyle, HeadingStyle, Options};
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

/// Elements whose content never reaches the output
const SKIPPED: &[&str] = &[
    "script", "style", "nav", "header", "footer", "aside", "noscript", "template",
];

/// Tried in order; the first match is treated as the main content
const CONTENT_ROOTS: &[&str] = &[
    "main",
    "article",
    ".content",
    ".main-content",
    ".post-content",
    ".entry-content",
    "#content",
    ".container",
    "body",
];

static ROOT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CONTENT_ROOTS
        .iter()
        .map(|s| Selector::parse(s).expect("content selector is valid"))
        .collect()
});

fn converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .skip_tags(SKIPPED.to_vec())
        .options(Options {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            bullet_list_marker: BulletListMarker::Dash,
            ..Default::default()
        })
        .build()
}

/// Convert the main content of a document to markdown
pub fn convert(doc: &Html) -> String {
    let root = ROOT_SELECTORS
        .iter()
        .find_map(|selector| doc.select(selector).next())
        .unwrap_or_else(|| doc.root_element());

    let markdown = match converter().convert(&root.html()) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            ::log::debug!("Markdown conversion failed: {}", e);
            String::new()
        }
    };

    if markdown.is_empty() {
        // Nothing rendered, fall back to the bare text
        return visible_text(root);
    }
    markdown
}

/// Collapsed text of `root`, leaving out skipped elements
fn visible_text(root: ElementRef) -> String {
    let mut words = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED.contains(&e.name()))
        });
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}
