use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use relative_path::RelativePath;

use crate::links::wikilinks;
use crate::render::{MarkdownRenderer, coalesce_text};

/// Markdown to plain display lines, for terminal front ends.
///
/// Inline markup is dropped, headings keep their `#` prefix, list items get
/// a bullet indented by nesting depth and wikilinks show their label.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn to_lines(&self, markdown: &str) -> Vec<String> {
        let mut lines = Vec::new();
        self.render(markdown, &mut lines, RelativePath::new(""));
        lines
    }
}

impl MarkdownRenderer for TextRenderer {
    type Target = Vec<String>;

    fn render(&self, markdown: &str, target: &mut Vec<String>, _context_path: &RelativePath) {
        let mut line = String::new();
        let mut list_depth = 0usize;
        let mut in_code = false;

        for event in coalesce_text(Parser::new(markdown)) {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    line.push_str(&"#".repeat(level as usize));
                    line.push(' ');
                }
                Event::Start(Tag::List(_)) => {
                    flush(&mut line, target);
                    list_depth += 1;
                }
                Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
                Event::Start(Tag::Item) => {
                    flush(&mut line, target);
                    line.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                    line.push_str("• ");
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    flush(&mut line, target);
                    in_code = true;
                }
                Event::End(TagEnd::CodeBlock) => in_code = false,
                Event::Text(text) if in_code => {
                    target.extend(text.lines().map(|l| format!("    {l}")));
                }
                Event::Text(text) => line.push_str(&with_link_labels(&text)),
                Event::Code(code) => line.push_str(&code),
                Event::SoftBreak | Event::HardBreak => flush(&mut line, target),
                Event::Rule => target.push("───".to_string()),
                Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                    flush(&mut line, target);
                }
                _ => {}
            }
        }
        flush(&mut line, target);
    }
}

fn flush(line: &mut String, target: &mut Vec<String>) {
    if !line.trim().is_empty() {
        target.push(std::mem::take(line));
    } else {
        line.clear();
    }
}

fn with_link_labels(text: &str) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for link in wikilinks(text) {
        out.push_str(&text[pos..link.span.start]);
        out.push_str(&link.label);
        pos = link.span.end;
    }
    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_structure_as_lines() {
        let md = "# Goals\n\nShip **it** with [[Plan|the plan]]\n\n- one\n  - nested\n- two\n\n```\ncode line\n```\n";
        assert_eq!(
            TextRenderer.to_lines(md),
            vec![
                "# Goals",
                "Ship it with the plan",
                "• one",
                "  • nested",
                "• two",
                "    code line",
            ]
        );
    }

    #[test]
    fn empty_column_renders_nothing() {
        assert!(TextRenderer.to_lines("\n\n").is_empty());
    }
}
