//! # Sync Controller
//!
//! Owns the write path from a [`BlockInstance`] back into the host document.
//!
//! The controller remembers the exact wrapped text it last knows to be in
//! the document. A commit serializes the block immediately and queues a write
//! due a short delay later; when the write runs, that remembered text is
//! located as a literal substring and replaced. This is optimistic
//! concurrency with the text itself as the token:
//!
//! - found at the expected offset, or exactly once anywhere → replace it and
//!   remember the new text, so back-to-back commits chain
//! - not found, or found more than once → drop the write (logged, no merge,
//!   no retry)
//!
//! Free-text edits go through an [`EditDebouncer`] first so a burst of
//! keystrokes becomes one commit.

pub mod debounce;

pub use debounce::{EDIT_QUIET_PERIOD, EditDebouncer};

use std::collections::VecDeque;
use std::ops::Range;
use std::time::{Duration, Instant};

use crate::columns::{BlockInstance, serialize};
use crate::editing::{BlockSite, DocumentHost, blocks};

/// Delay between a commit and its write, keeping writes out of the input
/// event that caused them.
pub const WRITE_DELAY: Duration = Duration::from_millis(50);

/// Why a write-back was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The remembered block text is no longer in the document.
    NotFound,
    /// The remembered block text occurs more than once and none of the
    /// occurrences is at the expected offset.
    Ambiguous,
}

/// Outcome of one write-back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The block now occupies `range` in the document.
    Written { range: Range<usize> },
    Dropped(DropReason),
}

#[derive(Debug, Clone)]
struct PendingWrite {
    due: Instant,
    text: String,
}

#[derive(Debug, Clone)]
pub struct SyncController {
    /// Block text last known to be in the document.
    original_text: String,
    /// `original_text` as it appears in the document, fences included.
    original_wrapped: String,
    open_fence: String,
    close_fence: String,
    /// Where `original_wrapped` was last seen.
    expected_offset: Option<usize>,
    pending: VecDeque<PendingWrite>,
}

impl SyncController {
    /// Track a block by its text, wrapped in the default fence.
    pub fn new(original_text: impl Into<String>) -> Self {
        let original_text = original_text.into();
        let (open_fence, close_fence) = blocks::default_fences(&original_text);
        Self {
            original_wrapped: blocks::wrap_with(&open_fence, &original_text, &close_fence),
            original_text,
            open_fence,
            close_fence,
            expected_offset: None,
            pending: VecDeque::new(),
        }
    }

    /// Track a block found in the document, keeping its own fences.
    pub fn for_site(site: &BlockSite) -> Self {
        Self {
            original_text: site.source.clone(),
            original_wrapped: site.wrapped.clone(),
            open_fence: site.open_fence.clone(),
            close_fence: site.close_fence.clone(),
            expected_offset: Some(site.span.start),
            pending: VecDeque::new(),
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn original_wrapped(&self) -> &str {
        &self.original_wrapped
    }

    pub fn expected_offset(&self) -> Option<usize> {
        self.expected_offset
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// When the next queued write becomes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.front().map(|w| w.due)
    }

    /// Serialize `instance` now and queue its write for `now + WRITE_DELAY`.
    ///
    /// Commits are never coalesced: each one produces its own write.
    pub fn commit(&mut self, instance: &BlockInstance, now: Instant) {
        let text = serialize(instance);
        log::debug!("queued block write ({} bytes)", text.len());
        self.pending.push_back(PendingWrite {
            due: now + WRITE_DELAY,
            text,
        });
    }

    /// Run every queued write that is due at `now`, in commit order.
    pub fn flush_due(&mut self, host: &mut impl DocumentHost, now: Instant) -> Vec<WriteResult> {
        let mut results = Vec::new();
        while self.pending.front().is_some_and(|w| w.due <= now) {
            if let Some(write) = self.pending.pop_front() {
                results.push(self.write_now(host, &write.text));
            }
        }
        results
    }

    /// Run every queued write regardless of its deadline.
    pub fn flush_all(&mut self, host: &mut impl DocumentHost) -> Vec<WriteResult> {
        let writes: Vec<PendingWrite> = self.pending.drain(..).collect();
        writes
            .iter()
            .map(|write| self.write_now(host, &write.text))
            .collect()
    }

    /// Replace the remembered block text in `host` with `new_text`.
    pub fn write_now(&mut self, host: &mut impl DocumentHost, new_text: &str) -> WriteResult {
        let document = host.document_text();
        let start = match locate(&document, &self.original_wrapped, self.expected_offset) {
            Ok(start) => start,
            Err(reason) => {
                log::warn!("column block write-back dropped: {reason:?}");
                return WriteResult::Dropped(reason);
            }
        };

        let end = start + self.original_wrapped.len();
        let (open_fence, close_fence) =
            blocks::fences_for(&self.open_fence, &self.close_fence, new_text);
        let wrapped = blocks::wrap_with(&open_fence, new_text, &close_fence);
        host.replace_range(start..end, &wrapped);

        log::info!("wrote column block at {start}..{end}");
        let range = start..start + wrapped.len();
        self.original_text = new_text.to_string();
        self.original_wrapped = wrapped;
        self.open_fence = open_fence;
        self.close_fence = close_fence;
        self.expected_offset = Some(start);
        WriteResult::Written { range }
    }
}

/// Find `needle` in `document`, preferring `expected` if it still matches
/// there, else accepting a single unambiguous occurrence.
pub fn locate(document: &str, needle: &str, expected: Option<usize>) -> Result<usize, DropReason> {
    if needle.is_empty() {
        return Err(DropReason::NotFound);
    }

    if let Some(at) = expected
        && document.get(at..).is_some_and(|rest| rest.starts_with(needle))
    {
        return Ok(at);
    }

    let mut hits = document.match_indices(needle).map(|(i, _)| i);
    match (hits.next(), hits.next()) {
        (Some(at), None) => Ok(at),
        (None, _) => Err(DropReason::NotFound),
        (Some(_), Some(_)) => Err(DropReason::Ambiguous),
    }
}
