//! # Interaction Engine
//!
//! Translates user gestures into [`BlockInstance`] mutations.
//!
//! Each drag is a small state machine, `Idle → Dragging → Committed |
//! Cancelled`, held as an explicit [`Gesture`] value owned by one
//! [`InteractionEngine`]. At most one gesture is active at a time; starting a
//! second one while another is in flight is refused.
//!
//! - **Resize** (`resize`): a divider drag redistributes width between the
//!   two neighbouring columns only, clamped to a minimum pixel width, and
//!   commits every rendered width on release.
//! - **Reorder** (`reorder`): drag a column onto another; the drop splices
//!   the column into place and invalidates any view keyed by index.
//! - **Add / remove**: stateless button actions.
//!
//! Every method that may change the model returns an [`Outcome`] telling the
//! caller whether to write back and whether the rendered column list must be
//! rebuilt.

pub mod reorder;
pub mod resize;

pub use reorder::ReorderDrag;
pub use resize::ResizeDrag;

use crate::columns::{BlockInstance, Position};

/// The gesture in flight, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Resize(ResizeDrag),
    Reorder(ReorderDrag),
}

/// Result of a gesture step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened (no matching gesture, refused or no-op).
    Ignored,
    /// A gesture ended without touching the model.
    Cancelled,
    /// The model was updated and must be written back.
    ///
    /// `structural` is set when columns were added, removed or moved, which
    /// invalidates anything keyed by column index.
    Committed { structural: bool },
}

impl Outcome {
    pub fn needs_write_back(self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    pub fn needs_rebuild(self) -> bool {
        matches!(self, Outcome::Committed { structural: true })
    }
}

#[derive(Debug, Default)]
pub struct InteractionEngine {
    gesture: Option<Gesture>,
}

impl InteractionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.gesture.is_none()
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Live widths while a resize is in progress.
    pub fn resize_preview(&self) -> Option<Vec<f64>> {
        match &self.gesture {
            Some(Gesture::Resize(drag)) => Some(drag.widths()),
            _ => None,
        }
    }

    pub fn dragged_column(&self) -> Option<usize> {
        match &self.gesture {
            Some(Gesture::Reorder(drag)) => Some(drag.dragged()),
            _ => None,
        }
    }

    pub fn drop_target(&self) -> Option<usize> {
        match &self.gesture {
            Some(Gesture::Reorder(drag)) => drag.drop_target(),
            _ => None,
        }
    }

    // Resize

    /// Pointer down on the divider right of column `divider`.
    ///
    /// `rendered_widths` are the current on-screen percentages of all columns.
    pub fn begin_resize(
        &mut self,
        divider: usize,
        pointer_x: f64,
        rendered_widths: &[f64],
        track_width_px: f64,
    ) -> bool {
        if self.gesture.is_some() {
            log::debug!("begin_resize ignored: another gesture is active");
            return false;
        }
        match ResizeDrag::start(divider, pointer_x, rendered_widths, track_width_px) {
            Some(drag) => {
                self.gesture = Some(Gesture::Resize(drag));
                true
            }
            None => false,
        }
    }

    /// Pointer move during a resize. Returns the new neighbour widths.
    pub fn resize_move(&mut self, pointer_x: f64) -> Option<(f64, f64)> {
        match self.gesture.as_mut() {
            Some(Gesture::Resize(drag)) => Some(drag.update(pointer_x)),
            _ => None,
        }
    }

    /// Pointer up: persist all rendered widths. Releasing always commits.
    pub fn end_resize(&mut self, instance: &mut BlockInstance) -> Outcome {
        match self.gesture.take() {
            Some(Gesture::Resize(drag)) => {
                instance.set_column_widths(&drag.widths());
                Outcome::Committed { structural: false }
            }
            other => {
                self.gesture = other;
                Outcome::Ignored
            }
        }
    }

    // Reorder

    pub fn begin_reorder(&mut self, index: usize, column_count: usize) -> bool {
        if self.gesture.is_some() || index >= column_count {
            return false;
        }
        self.gesture = Some(Gesture::Reorder(ReorderDrag::start(index)));
        true
    }

    /// Drag entered column `index`; purely cosmetic.
    pub fn drag_enter(&mut self, index: usize) {
        if let Some(Gesture::Reorder(drag)) = self.gesture.as_mut() {
            drag.enter(index);
        }
    }

    pub fn drag_leave(&mut self, index: usize) {
        if let Some(Gesture::Reorder(drag)) = self.gesture.as_mut() {
            drag.leave(index);
        }
    }

    /// Drop on column `index`. Dropping a column on itself is a no-op.
    pub fn drop_on(&mut self, index: usize, instance: &mut BlockInstance) -> Outcome {
        let drag = match self.gesture.take() {
            Some(Gesture::Reorder(drag)) => drag,
            other => {
                self.gesture = other;
                return Outcome::Ignored;
            }
        };

        if instance.reorder_column(drag.dragged(), index) {
            Outcome::Committed { structural: true }
        } else {
            Outcome::Cancelled
        }
    }

    /// Drag ended, with or without a drop. Always clears reorder state.
    pub fn drag_end(&mut self) -> Outcome {
        match self.gesture {
            Some(Gesture::Reorder(_)) => {
                self.gesture = None;
                Outcome::Cancelled
            }
            _ => Outcome::Ignored,
        }
    }

    // Buttons. Both are ignored mid-gesture: a drag holds column indices.

    pub fn add_column(
        &mut self,
        instance: &mut BlockInstance,
        at: usize,
        position: Position,
    ) -> Outcome {
        if self.gesture.is_some() {
            return Outcome::Ignored;
        }
        if instance.insert_column(at, position) {
            Outcome::Committed { structural: true }
        } else {
            Outcome::Ignored
        }
    }

    /// Removing the last remaining column is refused silently.
    pub fn remove_column(&mut self, instance: &mut BlockInstance, index: usize) -> Outcome {
        if self.gesture.is_some() {
            return Outcome::Ignored;
        }
        if instance.remove_column(index) {
            Outcome::Committed { structural: true }
        } else {
            Outcome::Ignored
        }
    }
}
