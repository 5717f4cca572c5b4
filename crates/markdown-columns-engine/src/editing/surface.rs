use crate::links::WIKILINK_OPEN;

/// Transient raw-text editor for one column.
///
/// The session never touches the block: `finish` hands back the edited text
/// for the caller to store and commit, `cancel` throws it away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    column: usize,
    original: String,
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary.
    cursor: usize,
}

/// Where an unfinished `[[` link starts and what has been typed after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionQuery {
    /// Byte offset of the `[[`.
    pub start: usize,
    pub query: String,
}

impl EditSession {
    /// Open an editor on `text`, with the cursor at the end.
    pub fn open(column: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            column,
            cursor: text.len(),
            original: text.clone(),
            buffer: text,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text the session was opened with.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.original
    }

    /// Replace the whole buffer, keeping the cursor in range.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = floor_boundary(&self.buffer, self.cursor);
    }

    pub fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) -> bool {
        match self.buffer[..self.cursor].chars().next_back() {
            Some(c) => {
                self.cursor -= c.len_utf8();
                self.buffer.remove(self.cursor);
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_to(&mut self, at: usize) {
        self.cursor = floor_boundary(&self.buffer, at);
    }

    /// Discard the edit.
    pub fn cancel(self) {
        log::debug!("discarding edit of column {}", self.column);
    }

    /// End the session, returning `(column, text)` to store.
    pub fn finish(self) -> (usize, String) {
        (self.column, self.buffer)
    }

    /// The link being typed at the cursor, if the cursor follows an
    /// unclosed `[[` on the current line.
    pub fn completion_query(&self) -> Option<CompletionQuery> {
        let before = &self.buffer[..self.cursor];
        let start = before.rfind(WIKILINK_OPEN)?;
        let query = &before[start + WIKILINK_OPEN.len()..];
        if query.contains([']', '\n', '|']) || query.contains(WIKILINK_OPEN) {
            return None;
        }
        Some(CompletionQuery {
            start,
            query: query.to_string(),
        })
    }

    /// Replace the link being typed with `[[name]]`.
    ///
    /// Closing brackets already right of the cursor are absorbed.
    pub fn accept_completion(&mut self, name: &str) -> bool {
        let Some(CompletionQuery { start, .. }) = self.completion_query() else {
            return false;
        };

        let mut end = self.cursor;
        if self.buffer[end..].starts_with("]]") {
            end += 2;
        }

        let link = format!("[[{name}]]");
        self.buffer.replace_range(start..end, &link);
        self.cursor = start + link.len();
        true
    }
}

fn floor_boundary(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
