use std::ops::Range;

/// Access to the document that hosts column blocks.
///
/// The sync controller reads the full text to locate a block and replaces
/// exactly one byte range per write. Offsets are UTF-8 byte offsets.
pub trait DocumentHost {
    /// Current full text of the document.
    fn document_text(&self) -> String;

    /// Replace `range` with `text`.
    fn replace_range(&mut self, range: Range<usize>, text: &str);

    /// Byte offset of the cursor.
    fn cursor(&self) -> usize;
}

impl DocumentHost for String {
    fn document_text(&self) -> String {
        self.clone()
    }

    fn replace_range(&mut self, range: Range<usize>, text: &str) {
        String::replace_range(self, range, text);
    }

    fn cursor(&self) -> usize {
        self.len()
    }
}
