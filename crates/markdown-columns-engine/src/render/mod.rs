//! Turning column text into something a host can show.
//!
//! Column text is ordinary markdown, so rendering goes through the
//! [`MarkdownRenderer`] capability. [`HtmlRenderer`] targets web views,
//! [`TextRenderer`] targets terminals. [`BlockView`] is the per-render layout
//! of a whole block and is rebuilt from the model after every structural
//! change.

pub mod html;
pub mod text;
pub mod view;

pub use html::HtmlRenderer;
pub use text::TextRenderer;
pub use view::{BlockView, ColumnView};

use pulldown_cmark::{CowStr, Event};
use relative_path::RelativePath;

/// Renders markdown into a host-specific target.
pub trait MarkdownRenderer {
    type Target;

    /// Render `markdown` into `target`. `context_path` is the note the text
    /// came from, for resolving relative links.
    fn render(&self, markdown: &str, target: &mut Self::Target, context_path: &RelativePath);
}

pub const MIN_BUTTON_SCALE: f64 = 0.5;
pub const MAX_BUTTON_SCALE: f64 = 2.0;

/// Display settings for a rendered block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub show_column_borders: bool,
    /// Scale for the add/remove/drag buttons, within
    /// [`MIN_BUTTON_SCALE`]..=[`MAX_BUTTON_SCALE`].
    pub button_size_scale: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_column_borders: false,
            button_size_scale: 1.0,
        }
    }
}

impl RenderOptions {
    pub fn new(show_column_borders: bool, button_size_scale: f64) -> Self {
        let button_size_scale = if button_size_scale.is_finite() {
            button_size_scale.clamp(MIN_BUTTON_SCALE, MAX_BUTTON_SCALE)
        } else {
            1.0
        };
        Self {
            show_column_borders,
            button_size_scale,
        }
    }
}

/// Merge runs of adjacent text events.
///
/// pulldown-cmark splits text at bracket characters it considered as link
/// starts, which would cut `[[wikilinks]]` into pieces.
pub(crate) fn coalesce_text<'a>(events: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out: Vec<Event<'a>> = Vec::new();
    for event in events {
        match (out.last_mut(), event) {
            (Some(Event::Text(prev)), Event::Text(next)) => {
                *prev = CowStr::from(format!("{prev}{next}"));
            }
            (_, event) => out.push(event),
        }
    }
    out
}
