use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::SectionResult;

static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]\(.*?\)").unwrap());

static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[.*?\]\(.*?\)").unwrap());

static FENCED_CODE_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?ms)^```.*?```").unwrap());

const MAX_HEADING_LEVEL: usize = 6;

/// Structural counts extracted from Markdown-ish text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownStructure {
    pub headings: Vec<String>,
    pub links: usize,
    pub images: usize,
    pub code_blocks: usize,
    pub list_items: usize,
}

fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// `"<hashes> <text>"` for an ATX heading line, `None` otherwise.
fn heading(line: &str) -> Option<String> {
    let hashes = line.len() - line.trim_start_matches('#').len();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    // Text after the whitespace run is kept as written; a whitespace-only
    // remainder is not a heading.
    let title = rest.trim_start();
    if title.is_empty() {
        return None;
    }
    Some(format!("{} {}", &line[..hashes], title))
}

fn is_list_item(line: &str) -> bool {
    let mut chars = line.trim_start_matches([' ', '\t']).chars();
    matches!(chars.next(), Some('-' | '*' | '+')) && matches!(chars.next(), Some(' ' | '\t'))
}

/// Extract headings, links, images, fenced code blocks and list items.
///
/// Every pattern is matched against the whole text on its own, so an image
/// also counts as a link.
pub fn extract(text: &str) -> SectionResult<MarkdownStructure> {
    Ok(MarkdownStructure {
        headings: lines(text).filter_map(heading).collect(),
        links: LINK_RE.find_iter(text).count(),
        images: IMAGE_RE.find_iter(text).count(),
        code_blocks: FENCED_CODE_BLOCK_RE.find_iter(text).count(),
        list_items: lines(text).filter(|line| is_list_item(line)).count(),
    })
}
