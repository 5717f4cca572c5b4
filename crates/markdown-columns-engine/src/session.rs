use std::time::Instant;

use crate::columns::{BlockInstance, Position, parse};
use crate::editing::{BlockSite, DocumentHost, EditSession};
use crate::interaction::{InteractionEngine, Outcome};
use crate::render::{BlockView, RenderOptions};
use crate::sync::{EditDebouncer, SyncController, WriteResult};

/// One live column block: its model, pending writes, gesture and edit state,
/// and the current view.
///
/// Every mutation goes through here so that model changes, write-backs and
/// view rebuilds stay in step. Time is passed in; call [`BlockSession::tick`]
/// from the event loop to run due writes.
#[derive(Debug)]
pub struct BlockSession {
    instance: BlockInstance,
    sync: SyncController,
    engine: InteractionEngine,
    edit: Option<EditSession>,
    edits: EditDebouncer<(usize, String)>,
    view: BlockView,
}

impl BlockSession {
    pub fn open(site: &BlockSite, options: RenderOptions, track_width_px: f64) -> Self {
        let instance = parse(&site.source);
        let view = BlockView::build(&instance, options, track_width_px);
        Self {
            sync: SyncController::for_site(site),
            engine: InteractionEngine::new(),
            edit: None,
            edits: EditDebouncer::default(),
            instance,
            view,
        }
    }

    pub fn instance(&self) -> &BlockInstance {
        &self.instance
    }

    pub fn view(&self) -> &BlockView {
        &self.view
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn set_track_width(&mut self, track_width_px: f64) {
        if self.view.track_width_px != track_width_px {
            self.view = BlockView::build(&self.instance, self.view.options, track_width_px);
        }
    }

    /// Widths to draw right now: the live resize preview while dragging,
    /// else the laid-out widths.
    pub fn display_widths(&self) -> Vec<f64> {
        self.engine
            .resize_preview()
            .unwrap_or_else(|| self.view.rendered_widths())
    }

    fn settle(&mut self, outcome: Outcome, now: Instant) -> Outcome {
        if outcome.needs_write_back() {
            self.sync.commit(&self.instance, now);
        }
        if outcome.needs_rebuild() {
            self.view = BlockView::build(&self.instance, self.view.options, self.view.track_width_px);
        } else if outcome.needs_write_back() {
            self.view.refresh(&self.instance);
        }
        outcome
    }

    // Buttons

    /// Refused while editing: the editor holds a column index.
    pub fn add_column(&mut self, at: usize, position: Position, now: Instant) -> Outcome {
        if self.edit.is_some() {
            return Outcome::Ignored;
        }
        let outcome = self.engine.add_column(&mut self.instance, at, position);
        self.settle(outcome, now)
    }

    pub fn remove_column(&mut self, index: usize, now: Instant) -> Outcome {
        if self.edit.is_some() {
            return Outcome::Ignored;
        }
        let outcome = self.engine.remove_column(&mut self.instance, index);
        self.settle(outcome, now)
    }

    // Resize

    pub fn begin_resize(&mut self, divider: usize, pointer_x: f64) -> bool {
        let widths = self.view.rendered_widths();
        self.engine
            .begin_resize(divider, pointer_x, &widths, self.view.track_width_px)
    }

    pub fn resize_move(&mut self, pointer_x: f64) -> Option<(f64, f64)> {
        self.engine.resize_move(pointer_x)
    }

    pub fn end_resize(&mut self, now: Instant) -> Outcome {
        let outcome = self.engine.end_resize(&mut self.instance);
        self.settle(outcome, now)
    }

    // Reorder

    pub fn begin_reorder(&mut self, index: usize) -> bool {
        if self.edit.is_some() {
            return false;
        }
        self.engine
            .begin_reorder(index, self.instance.column_count())
    }

    pub fn drag_enter(&mut self, index: usize) {
        self.engine.drag_enter(index);
    }

    pub fn drag_leave(&mut self, index: usize) {
        self.engine.drag_leave(index);
    }

    pub fn drop_on(&mut self, index: usize, now: Instant) -> Outcome {
        let outcome = self.engine.drop_on(index, &mut self.instance);
        self.settle(outcome, now)
    }

    pub fn drag_end(&mut self) -> Outcome {
        self.engine.drag_end()
    }

    // Editing

    /// Open the raw-text editor on column `index`. Refused while a gesture or
    /// another edit is active.
    pub fn start_edit(&mut self, index: usize) -> bool {
        if self.edit.is_some() || !self.engine.is_idle() {
            return false;
        }
        match self.instance.column(index) {
            Some(text) => {
                self.edit = Some(EditSession::open(index, text));
                true
            }
            None => false,
        }
    }

    pub fn edit(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn edit_mut(&mut self) -> Option<&mut EditSession> {
        self.edit.as_mut()
    }

    /// Record that the open editor's text changed; it is committed once
    /// typing goes quiet.
    pub fn note_edit(&mut self, now: Instant) {
        if let Some(edit) = &self.edit {
            self.edits
                .push((edit.column(), edit.text().to_string()), now);
        }
    }

    /// Close the editor, storing and committing its text.
    pub fn save_edit(&mut self, now: Instant) -> Outcome {
        let Some(edit) = self.edit.take() else {
            return Outcome::Ignored;
        };
        self.edits.cancel();
        let (column, text) = edit.finish();
        self.store_text(column, text, now)
    }

    /// Close the editor without keeping its text. Anything already committed
    /// from this session is reverted.
    pub fn cancel_edit(&mut self, now: Instant) -> Outcome {
        let Some(edit) = self.edit.take() else {
            return Outcome::Ignored;
        };
        self.edits.cancel();
        let column = edit.column();
        let original = edit.original().to_string();
        edit.cancel();
        self.store_text(column, original, now)
    }

    fn store_text(&mut self, column: usize, text: String, now: Instant) -> Outcome {
        if self.instance.column(column) == Some(text.as_str()) {
            return Outcome::Cancelled;
        }
        if !self.instance.set_column_content(column, text) {
            return Outcome::Ignored;
        }
        self.settle(Outcome::Committed { structural: false }, now)
    }

    // Time

    /// Earliest moment [`BlockSession::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.edits.deadline(), self.sync.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.edits.is_pending() || self.sync.has_pending()
    }

    /// Commit quiet edits and run due writes.
    pub fn tick(&mut self, host: &mut impl DocumentHost, now: Instant) -> Vec<WriteResult> {
        if let Some((column, text)) = self.edits.poll(now) {
            self.store_text(column, text, now);
        }
        self.sync.flush_due(host, now)
    }

    /// Commit any pending edit and run every queued write now.
    pub fn flush(&mut self, host: &mut impl DocumentHost, now: Instant) -> Vec<WriteResult> {
        if let Some((column, text)) = self.edits.flush() {
            self.store_text(column, text, now);
        }
        self.sync.flush_all(host)
    }
}
