use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::Document;

/// Edits that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    ReplaceRange { range: Range<usize>, text: String },
}

impl Cmd {
    /// Byte range of the original document this command touches.
    fn touched(&self) -> Range<usize> {
        match self {
            Cmd::InsertText { at, .. } => *at..*at,
            Cmd::DeleteRange { range } | Cmd::ReplaceRange { range, .. } => range.clone(),
        }
    }

    fn inserted_len(&self) -> usize {
        match self {
            Cmd::InsertText { text, .. } | Cmd::ReplaceRange { text, .. } => text.len(),
            Cmd::DeleteRange { .. } => 0,
        }
    }

    /// Clamp offsets to the document and to char boundaries.
    pub(crate) fn clamped(self, doc: &Document) -> Self {
        let clamp = |at: usize| doc.char_boundary_at_or_before(at);
        match self {
            Cmd::InsertText { at, text } => Cmd::InsertText {
                at: clamp(at),
                text,
            },
            Cmd::DeleteRange { range } => {
                let start = clamp(range.start);
                let end = clamp(range.end).max(start);
                Cmd::DeleteRange { range: start..end }
            }
            Cmd::ReplaceRange { range, text } => {
                let start = clamp(range.start);
                let end = clamp(range.end).max(start);
                Cmd::ReplaceRange {
                    range: start..end,
                    text,
                }
            }
        }
    }
}

/// Compile a command into a delta
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Delta<RopeInfo> {
    let mut builder = Builder::new(doc.len());
    match cmd {
        Cmd::InsertText { at, text } => {
            builder.replace(*at..*at, Rope::from(text));
        }
        Cmd::DeleteRange { range } => {
            builder.delete(range.clone());
        }
        Cmd::ReplaceRange { range, text } => {
            builder.replace(range.clone(), Rope::from(text));
        }
    }
    builder.build()
}

/// Where the cursor ends up after `cmd`.
///
/// A cursor after the edit shifts by the size change; a cursor inside a
/// replaced or deleted range moves to the end of the inserted text.
pub(crate) fn transform_cursor(cursor: usize, cmd: &Cmd) -> usize {
    let touched = cmd.touched();
    let inserted = cmd.inserted_len();

    if touched.is_empty() {
        // Insertion at the cursor pushes it right, like typing.
        if cursor < touched.start {
            cursor
        } else {
            cursor + inserted
        }
    } else if cursor <= touched.start {
        cursor
    } else if cursor >= touched.end {
        cursor - touched.len() + inserted
    } else {
        touched.start + inserted
    }
}
