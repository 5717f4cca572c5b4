use std::ops::Range;

use tree_sitter::{Node, Parser};
use tree_sitter_md::LANGUAGE;

use crate::columns::{BlockInstance, serialize};
use crate::editing::DocumentHost;

/// Info-string language that marks a fenced code block as a column block.
pub const BLOCK_LANGUAGE: &str = "columns";

/// A column block found in a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSite {
    /// Opening fence through closing fence, without the trailing newline.
    pub span: Range<usize>,
    /// The block text between the fences.
    pub content: Range<usize>,
    /// Opening fence line as written, e.g. "```columns".
    pub open_fence: String,
    /// Closing fence line as written; the opener's fence when unterminated.
    pub close_fence: String,
    /// Exact document text covered by `span`.
    pub wrapped: String,
    /// Exact document text covered by `content`.
    pub source: String,
}

impl BlockSite {
    /// Wrap block text in this site's own fences.
    pub fn wrap(&self, text: &str) -> String {
        wrap_with(&self.open_fence, text, &self.close_fence)
    }
}

/// Wrap block text in the default backtick fence, lengthened if the text
/// needs it.
pub fn wrap(text: &str) -> String {
    let (open, close) = default_fences(text);
    wrap_with(&open, text, &close)
}

/// The default backtick fences for `text`.
pub fn default_fences(text: &str) -> (String, String) {
    fences_for(&format!("```{BLOCK_LANGUAGE}"), "```", text)
}

/// Fences that keep `text` inside the block.
///
/// A line of `text` starting with a run of the fence character at least as
/// long as the fence would close the block early, so the fence grows to one
/// more than the longest such run. Otherwise the given fences are returned
/// as they are.
pub fn fences_for(open_fence: &str, close_fence: &str, text: &str) -> (String, String) {
    let Some(marker) = open_fence.chars().next() else {
        return (open_fence.to_string(), close_fence.to_string());
    };
    let run = open_fence.chars().take_while(|&c| c == marker).count();
    let longest = text
        .lines()
        .map(|line| {
            line.trim_start_matches(' ')
                .chars()
                .take_while(|&c| c == marker)
                .count()
        })
        .max()
        .unwrap_or(0);

    if longest < run {
        return (open_fence.to_string(), close_fence.to_string());
    }
    let fence = marker.to_string().repeat(longest + 1);
    (format!("{fence}{}", &open_fence[run..]), fence)
}

pub fn wrap_with(open_fence: &str, text: &str, close_fence: &str) -> String {
    format!("{open_fence}\n{text}\n{close_fence}")
}

/// Insert an empty block of `column_count` columns at the host's cursor.
///
/// Newlines are added as needed so the fences sit on their own lines.
/// Returns the span of the wrapped block in the updated document.
pub fn insert_block_at_cursor(host: &mut impl DocumentHost, column_count: usize) -> Range<usize> {
    let wrapped = wrap(&serialize(&BlockInstance::with_columns(column_count)));
    let text = host.document_text();
    let mut at = host.cursor().min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }

    let mut insert = String::new();
    if !text[..at].is_empty() && !text[..at].ends_with('\n') {
        insert.push('\n');
    }
    let start = at + insert.len();
    insert.push_str(&wrapped);
    insert.push('\n');
    let after = &text[at..];
    if !after.is_empty() && !after.starts_with('\n') {
        insert.push('\n');
    }

    host.replace_range(at..at, &insert);
    log::debug!("inserted {column_count}-column block at {start}");
    start..start + wrapped.len()
}

/// Find every top-level fenced code block tagged [`BLOCK_LANGUAGE`].
///
/// Blocks nested inside blockquotes or list items are skipped: their content
/// carries container prefixes that the block format doesn't understand.
pub fn find_column_blocks(text: &str) -> anyhow::Result<Vec<BlockSite>> {
    let mut parser = Parser::new();
    parser.set_language(&LANGUAGE.into())?;

    let Some(tree) = parser.parse(text, None) else {
        return Ok(Vec::new());
    };

    let mut sites = Vec::new();
    collect_sites(tree.root_node(), text, &mut sites);
    Ok(sites)
}

fn collect_sites(node: Node, text: &str, sites: &mut Vec<BlockSite>) {
    match node.kind() {
        "fenced_code_block" => {
            if let Some(site) = site_for_fence(&node, text) {
                sites.push(site);
            }
            return;
        }
        "block_quote" | "list_item" => return,
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_sites(child, text, sites);
    }
}

fn site_for_fence(node: &Node, text: &str) -> Option<BlockSite> {
    let range = node.byte_range();
    let raw = text.get(range.clone())?;
    let block = raw.trim_end_matches(['\n', '\r']);

    // A fence with nothing after the opening line has no block text at all.
    let first_newline = block.find('\n')?;
    let open_line = block[..first_newline].trim_end_matches('\r');
    let opener = open_line.trim_start();
    let fence: String = opener
        .chars()
        .take_while(|c| *c == '`' || *c == '~')
        .collect();
    let info = opener[fence.len()..].trim();
    if info.split_whitespace().next() != Some(BLOCK_LANGUAGE) {
        return None;
    }

    let last_newline = block.rfind('\n').unwrap_or(first_newline);
    let last_line = &block[last_newline + 1..];

    let (content, close_fence) = if closes_fence(last_line, &fence) {
        let end = last_newline.max(first_newline + 1);
        (first_newline + 1..end, last_line.to_string())
    } else {
        (first_newline + 1..block.len(), fence.clone())
    };

    Some(BlockSite {
        span: range.start..range.start + block.len(),
        content: range.start + content.start..range.start + content.end,
        open_fence: open_line.to_string(),
        close_fence,
        wrapped: block.to_string(),
        source: block[content].to_string(),
    })
}

/// Whether `line` closes a fence opened with `fence` (same character, at
/// least as long, nothing else on the line).
fn closes_fence(line: &str, fence: &str) -> bool {
    let Some(marker) = fence.chars().next() else {
        return false;
    };
    let trimmed = line.trim();
    trimmed.len() >= fence.len() && trimmed.chars().all(|c| c == marker)
}

/// The site whose span contains `offset`, if any.
pub fn site_at(sites: &[BlockSite], offset: usize) -> Option<(usize, &BlockSite)> {
    sites
        .iter()
        .enumerate()
        .find(|(_, site)| site.span.start <= offset && offset <= site.span.end)
}
