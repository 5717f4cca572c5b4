use pulldown_cmark::{CowStr, Event, Parser, Tag, TagEnd, html};
use relative_path::RelativePath;

use crate::links::wikilinks;
use crate::render::{MarkdownRenderer, coalesce_text};

/// Markdown to HTML via pulldown-cmark, with wikilinks as internal links.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn to_html(&self, markdown: &str, context_path: &RelativePath) -> String {
        let mut out = String::new();
        self.render(markdown, &mut out, context_path);
        out
    }
}

impl MarkdownRenderer for HtmlRenderer {
    type Target = String;

    fn render(&self, markdown: &str, target: &mut String, context_path: &RelativePath) {
        let mut in_code = false;
        let events = coalesce_text(Parser::new(markdown))
            .into_iter()
            .flat_map(move |event| {
                match &event {
                    Event::Start(Tag::CodeBlock(_)) => in_code = true,
                    Event::End(TagEnd::CodeBlock) => in_code = false,
                    _ => {}
                }
                if in_code {
                    vec![event]
                } else {
                    expand_wikilinks(event)
                }
            });

        target.push_str(&format!(
            "<div class=\"markdown-rendered\" data-source-path=\"{}\">",
            html_escape::encode_double_quoted_attribute(context_path.as_str())
        ));
        html::push_html(target, events);
        target.push_str("</div>");
    }
}

/// Split a text event around its wikilinks, emitting each link as an anchor.
fn expand_wikilinks(event: Event<'_>) -> Vec<Event<'_>> {
    let Event::Text(text) = event else {
        return vec![event];
    };
    let links = wikilinks(&text);
    if links.is_empty() {
        return vec![Event::Text(text)];
    }

    let mut events = Vec::new();
    let mut pos = 0;
    for link in links {
        if link.span.start > pos {
            events.push(Event::Text(CowStr::from(
                text[pos..link.span.start].to_string(),
            )));
        }
        events.push(Event::InlineHtml(CowStr::from(format!(
            "<a class=\"internal-link\" data-href=\"{}\" href=\"{}\">{}</a>",
            html_escape::encode_double_quoted_attribute(&link.target),
            html_escape::encode_double_quoted_attribute(&link.target),
            html_escape::encode_text(&link.label),
        ))));
        pos = link.span.end;
    }
    if pos < text.len() {
        events.push(Event::Text(CowStr::from(text[pos..].to_string())));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(md: &str) -> String {
        HtmlRenderer.to_html(md, RelativePath::new("plan.md"))
    }

    #[test]
    fn renders_markdown_inside_source_wrapper() {
        insta::assert_snapshot!(render("# Title\n\n- one\n"), @r#"
        <div class="markdown-rendered" data-source-path="plan.md"><h1>Title</h1>
        <ul>
        <li>one</li>
        </ul>
        </div>
        "#);
    }

    #[test]
    fn wikilinks_become_internal_links() {
        let html = render("see [[Project Plan|the plan]] today");
        assert!(html.contains(
            r#"see <a class="internal-link" data-href="Project Plan" href="Project Plan">the plan</a> today"#
        ));
    }

    #[test]
    fn link_text_and_targets_are_escaped() {
        let html = render("[[a\"b|Q&A]]");
        assert!(html.contains(r#"data-href="a&quot;b""#));
        assert!(html.contains(">Q&amp;A</a>"));
    }

    #[test]
    fn wikilinks_in_code_blocks_stay_literal() {
        let html = render("```\n[[Not a link]]\n```\n\n[[Link]]\n");
        assert!(html.contains("<pre><code>[[Not a link]]\n</code></pre>"));
        assert_eq!(html.matches("internal-link").count(), 1);
    }

    #[test]
    fn plain_text_is_escaped_by_pulldown() {
        assert!(render("a < b").contains("a &lt; b"));
    }
}
