/// State of one column drag-and-drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderDrag {
    dragged: usize,
    drop_target: Option<usize>,
}

impl ReorderDrag {
    pub fn start(dragged: usize) -> Self {
        Self {
            dragged,
            drop_target: None,
        }
    }

    pub fn dragged(&self) -> usize {
        self.dragged
    }

    /// Column currently highlighted as the drop target, if any.
    pub fn drop_target(&self) -> Option<usize> {
        self.drop_target
    }

    /// Pointer entered column `index`. Entering the dragged column itself
    /// clears the highlight.
    pub fn enter(&mut self, index: usize) {
        self.drop_target = (index != self.dragged).then_some(index);
    }

    pub fn leave(&mut self, index: usize) {
        if self.drop_target == Some(index) {
            self.drop_target = None;
        }
    }
}
