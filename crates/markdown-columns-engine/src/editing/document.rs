use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::{
    BlockSite, Cmd, DocumentHost, Patch, blocks,
    commands::{compile_command, transform_cursor},
};

/// An in-memory markdown document backed by an xi-rope buffer.
///
/// The rope is the single source of truth: column blocks are located in it
/// and written back into it, and `text()` returns its bytes verbatim so a
/// load/save cycle never reformats anything outside an edited block.
///
/// ```rust
/// # use markdown_columns_engine::editing::{Cmd, Document};
/// let mut doc = Document::from_bytes(b"Intro\n").unwrap();
/// let patch = doc.apply(Cmd::InsertText { at: 0, text: "# ".to_string() });
/// assert_eq!(doc.text(), "# Intro\n");
/// assert_eq!(patch.version, 1);
/// ```
#[derive(Clone)]
pub struct Document {
    buffer: Rope,
    /// Cursor as a byte offset into `buffer`
    cursor: usize,
    /// Incremented on every applied command
    version: u64,
}

impl Document {
    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        let buffer = Rope::from(text);
        let len = buffer.len();

        Ok(Self {
            buffer,
            cursor: len, // Start with cursor at end
            version: 0,
        })
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, at: usize) {
        self.cursor = self.char_boundary_at_or_before(at);
    }

    /// Apply a command, returning the changed ranges and new cursor.
    ///
    /// Offsets outside the document or inside a multi-byte character are
    /// clamped rather than rejected.
    pub fn apply(&mut self, cmd: Cmd) -> Patch {
        let cmd = cmd.clamped(self);
        let delta: Delta<RopeInfo> = compile_command(self, &cmd);

        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in delta.els.iter() {
            match op {
                xi_rope::delta::DeltaElement::Copy(from, to) => {
                    cursor += to - from;
                }
                xi_rope::delta::DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    let end = cursor + inserted.len();
                    changed.push(start..end);
                    cursor = end;
                }
            }
        }

        self.buffer = delta.apply(&self.buffer);
        self.cursor = transform_cursor(self.cursor, &cmd).min(self.buffer.len());
        self.version += 1;

        Patch {
            changed,
            new_cursor: self.cursor,
            version: self.version,
        }
    }

    /// Column blocks currently in the document, in document order.
    pub fn column_blocks(&self) -> anyhow::Result<Vec<BlockSite>> {
        blocks::find_column_blocks(&self.text())
    }

    /// Insert an empty block of `column_count` columns at the cursor.
    ///
    /// The fence is placed on its own lines. Returns the inserted span.
    pub fn insert_block_at_cursor(&mut self, column_count: usize) -> std::ops::Range<usize> {
        blocks::insert_block_at_cursor(self, column_count)
    }

    /// Largest char boundary at or before `at`, clamped to the document.
    pub(crate) fn char_boundary_at_or_before(&self, at: usize) -> usize {
        let mut at = at.min(self.buffer.len());
        while at > 0 && !self.buffer.is_codepoint_boundary(at) {
            at -= 1;
        }
        at
    }
}

impl DocumentHost for Document {
    fn document_text(&self) -> String {
        self.text()
    }

    fn replace_range(&mut self, range: std::ops::Range<usize>, text: &str) {
        self.apply(Cmd::ReplaceRange {
            range,
            text: text.to_string(),
        });
    }

    fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trip_is_lossless() {
        let original = "# Title\r\n\n\tweird   spacing\n```columns\nx\n```";
        let doc = Document::from_bytes(original.as_bytes()).unwrap();
        assert_eq!(doc.to_bytes(), original.as_bytes());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(Document::from_bytes(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn replace_reports_changed_range_and_version() {
        let mut doc = Document::from_bytes(b"hello world").unwrap();
        let patch = doc.apply(Cmd::ReplaceRange {
            range: 6..11,
            text: "there".into(),
        });
        assert_eq!(doc.text(), "hello there");
        assert_eq!(patch.changed, vec![6..11]);
        assert_eq!(patch.version, 1);
    }

    #[test]
    fn out_of_range_edits_are_clamped() {
        let mut doc = Document::from_bytes("héllo".as_bytes()).unwrap();
        doc.apply(Cmd::DeleteRange { range: 2..100 });
        assert_eq!(doc.text(), "h");
    }

    #[test]
    fn cursor_shifts_after_edit_before_it() {
        let mut doc = Document::from_bytes(b"abcdef").unwrap();
        doc.set_cursor(4);
        doc.apply(Cmd::InsertText {
            at: 1,
            text: "XY".into(),
        });
        assert_eq!(doc.cursor(), 6);
    }

    #[test]
    fn insert_block_at_cursor_adds_fenced_block_on_own_lines() {
        let mut doc = Document::from_bytes(b"before\nafter").unwrap();
        doc.set_cursor(6);
        let span = doc.insert_block_at_cursor(2);

        let text = doc.text();
        assert_eq!(
            &text[span.clone()],
            "```columns\ncolumns: 2\n===column===\n===column===\n```"
        );
        assert_eq!(&text[..span.start], "before\n");
        assert_eq!(&text[span.end..], "\n\nafter");

        let sites = doc.column_blocks().unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].span, span);
    }
}
