//! Wikilinks inside column text: extraction, click-through and completion.
//!
//! Links are written `[[target]]` or `[[target|label]]`. Navigation and the
//! list of known targets belong to the host, reached through the
//! [`Navigator`] and [`LinkIndex`] traits.

pub mod index;

pub use index::{COMPLETION_LIMIT, LinkIndex, NoteIndex, rank_candidates};

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use relative_path::RelativePath;

pub const WIKILINK_OPEN: &str = "[[";
pub const WIKILINK_CLOSE: &str = "]]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    /// Byte range of the whole link, brackets included.
    pub span: Range<usize>,
    pub target: String,
    /// Display text; the target when no alias is given.
    pub label: String,
}

/// Opens link targets on behalf of the block.
pub trait Navigator {
    /// Resolve `target` relative to the note at `context_path` and show it,
    /// in a new pane when `new_pane` is set.
    fn resolve_and_navigate(&mut self, target: &str, context_path: &RelativePath, new_pane: bool);
}

fn wikilink_regex() -> &'static Regex {
    static WIKILINK_REGEX: OnceLock<Regex> = OnceLock::new();
    WIKILINK_REGEX.get_or_init(|| {
        Regex::new(r"\[\[([^\[\]|\n]+)(?:\|([^\[\]\n]*))?\]\]").expect("Invalid wikilink regex")
    })
}

/// Every well-formed wikilink in `text`, in order.
pub fn wikilinks(text: &str) -> Vec<WikiLink> {
    wikilink_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let target = caps.get(1)?.as_str().trim();
            if target.is_empty() {
                return None;
            }
            let label = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|l| !l.is_empty())
                .unwrap_or(target);
            Some(WikiLink {
                span: whole.range(),
                target: target.to_string(),
                label: label.to_string(),
            })
        })
        .collect()
}

/// The link covering byte `offset`, if any.
pub fn link_at(text: &str, offset: usize) -> Option<WikiLink> {
    wikilinks(text)
        .into_iter()
        .find(|link| link.span.contains(&offset))
}

/// Navigate to the link under `offset`. Returns whether a link was hit.
pub fn follow_link(
    navigator: &mut impl Navigator,
    text: &str,
    offset: usize,
    context_path: &RelativePath,
    new_pane: bool,
) -> bool {
    match link_at(text, offset) {
        Some(link) => {
            log::debug!("following [[{}]] from {}", link.target, context_path);
            navigator.resolve_and_navigate(&link.target, context_path, new_pane);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Vec<(String, String, bool)>,
    }

    impl Navigator for RecordingNavigator {
        fn resolve_and_navigate(
            &mut self,
            target: &str,
            context_path: &RelativePath,
            new_pane: bool,
        ) {
            self.visits
                .push((target.to_string(), context_path.to_string(), new_pane));
        }
    }

    #[test]
    fn extracts_targets_and_labels() {
        let text = "see [[Project Plan]] and [[notes/todo|my list]]";
        assert_eq!(
            wikilinks(text),
            vec![
                WikiLink {
                    span: 4..20,
                    target: "Project Plan".into(),
                    label: "Project Plan".into(),
                },
                WikiLink {
                    span: 25..47,
                    target: "notes/todo".into(),
                    label: "my list".into(),
                },
            ]
        );
    }

    #[rstest]
    #[case::unclosed("[[open")]
    #[case::empty("[[]]")]
    #[case::blank("[[   ]]")]
    #[case::across_lines("[[a\nb]]")]
    fn malformed_links_are_ignored(#[case] text: &str) {
        assert!(wikilinks(text).is_empty());
    }

    #[test]
    fn link_at_uses_the_whole_span() {
        let text = "x [[A]] y";
        assert_eq!(link_at(text, 2).map(|l| l.target), Some("A".into()));
        assert_eq!(link_at(text, 6).map(|l| l.target), Some("A".into()));
        assert_eq!(link_at(text, 7), None);
    }

    #[test]
    fn follow_link_calls_navigator_with_context() {
        let mut nav = RecordingNavigator::default();
        let text = "go [[Target]]";
        let context = RelativePath::new("journal/today.md");

        assert!(follow_link(&mut nav, text, 5, context, true));
        assert!(!follow_link(&mut nav, text, 0, context, false));
        assert_eq!(
            nav.visits,
            vec![("Target".into(), "journal/today.md".into(), true)]
        );
    }
}
