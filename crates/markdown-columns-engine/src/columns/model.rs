use serde::{Deserialize, Serialize};

/// Column count used when a block doesn't declare a usable one.
pub const DEFAULT_COLUMN_COUNT: usize = 2;

/// Widths within this many percentage points of the equal split are not
/// persisted; rendered pixel widths never come back as exact percentages.
pub const WIDTH_NOISE_THRESHOLD: f64 = 1.0;

/// Header configuration of a column block.
///
/// Every field is independently optional in the text format; missing values
/// fall back to the defaults documented on each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Number of columns (always >= 1). Defaults to [`DEFAULT_COLUMN_COUNT`].
    pub column_count: usize,
    /// Custom percentage widths, one per column. `None` means equal split.
    pub column_widths: Option<Vec<f64>>,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            column_count: DEFAULT_COLUMN_COUNT,
            column_widths: None,
        }
    }
}

impl BlockConfig {
    /// Percentage width of every column when no custom widths are stored.
    pub fn equal_split(&self) -> f64 {
        100.0 / self.column_count.max(1) as f64
    }
}

/// Where to place a new column relative to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

/// One parsed column block.
///
/// Columns have no identity beyond their index: insert, remove and reorder
/// all operate by splicing the `columns` vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub config: BlockConfig,
    /// Raw markdown of each column, in display order.
    pub columns: Vec<String>,
}

impl BlockInstance {
    /// Create an empty block with `count` columns (at least one).
    pub fn with_columns(count: usize) -> Self {
        let count = count.max(1);
        Self {
            config: BlockConfig {
                column_count: count,
                column_widths: None,
            },
            columns: vec![String::new(); count],
        }
    }

    pub fn column_count(&self) -> usize {
        self.config.column_count
    }

    pub fn column_widths(&self) -> Option<&[f64]> {
        self.config.column_widths.as_deref()
    }

    pub fn column(&self, index: usize) -> Option<&str> {
        if index >= self.config.column_count {
            return None;
        }
        self.columns.get(index).map(String::as_str)
    }

    /// Stored widths, or the equal split when none are stored.
    pub fn effective_widths(&self) -> Vec<f64> {
        match self.column_widths() {
            Some(widths) if widths.len() == self.config.column_count => widths.to_vec(),
            _ => vec![self.config.equal_split(); self.config.column_count],
        }
    }

    /// Change the number of columns, appending empty columns or truncating
    /// from the end. Any count change resets widths to the equal split.
    pub fn set_column_count(&mut self, count: usize) -> bool {
        self.normalize();
        let count = count.max(1);
        if count == self.config.column_count {
            return false;
        }
        self.config.column_count = count;
        self.reset_widths();
        self.normalize();
        true
    }

    /// Insert an empty column before or after `at`.
    ///
    /// Inserting after the last column (or past the end) appends.
    pub fn insert_column(&mut self, at: usize, position: Position) -> bool {
        self.normalize();
        let index = match position {
            Position::Before => at,
            Position::After => at.saturating_add(1),
        }
        .min(self.columns.len());

        self.columns.insert(index, String::new());
        self.config.column_count += 1;
        self.reset_widths();
        true
    }

    /// Remove the column at `index`. Refused when it is the last column.
    pub fn remove_column(&mut self, index: usize) -> bool {
        self.normalize();
        if self.config.column_count <= 1 {
            log::debug!("refusing to remove the only column");
            return false;
        }
        if index >= self.columns.len() {
            log::debug!("remove_column: index {index} out of range");
            return false;
        }

        self.columns.remove(index);
        self.config.column_count -= 1;
        self.reset_widths();
        true
    }

    /// Move one column from `from` to `to` (remove, then insert).
    ///
    /// Custom widths move with the column so each width stays attached to its
    /// visual position. Widths are never reset by a reorder.
    pub fn reorder_column(&mut self, from: usize, to: usize) -> bool {
        self.normalize();
        let len = self.columns.len();
        if from == to || from >= len || to >= len {
            return false;
        }

        let column = self.columns.remove(from);
        self.columns.insert(to, column);

        if let Some(widths) = self.config.column_widths.as_mut()
            && from < widths.len()
            && to < widths.len()
        {
            let width = widths.remove(from);
            widths.insert(to, width);
        }
        true
    }

    /// Store custom widths if they differ meaningfully from the equal split.
    ///
    /// Returns `false` when `widths` has the wrong length (nothing changes).
    /// Widths that are all within [`WIDTH_NOISE_THRESHOLD`] of the equal split
    /// clear any stored widths instead.
    pub fn set_column_widths(&mut self, widths: &[f64]) -> bool {
        self.normalize();
        if widths.len() != self.config.column_count {
            log::debug!(
                "set_column_widths: got {} widths for {} columns",
                widths.len(),
                self.config.column_count
            );
            return false;
        }

        let equal = self.config.equal_split();
        let custom = widths
            .iter()
            .any(|w| (w - equal).abs() > WIDTH_NOISE_THRESHOLD);

        let next = custom.then(|| widths.to_vec());
        if next == self.config.column_widths {
            return false;
        }
        self.config.column_widths = next;
        true
    }

    /// Replace the raw text of one column.
    pub fn set_column_content(&mut self, index: usize, text: impl Into<String>) -> bool {
        self.normalize();
        match self.columns.get_mut(index) {
            Some(column) => {
                *column = text.into();
                true
            }
            None => false,
        }
    }

    /// Pad or truncate `columns` (and widths) to match `column_count`.
    pub fn normalize(&mut self) {
        self.config.column_count = self.config.column_count.max(1);
        let count = self.config.column_count;
        self.columns.resize(count, String::new());
        if self
            .config
            .column_widths
            .as_ref()
            .is_some_and(|w| w.len() != count)
        {
            self.reset_widths();
        }
    }

    fn reset_widths(&mut self) {
        self.config.column_widths = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn block(columns: &[&str]) -> BlockInstance {
        BlockInstance {
            config: BlockConfig {
                column_count: columns.len(),
                column_widths: None,
            },
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn assert_invariants(b: &BlockInstance) {
        assert_eq!(b.columns.len(), b.config.column_count);
        if let Some(widths) = &b.config.column_widths {
            assert_eq!(widths.len(), b.config.column_count);
        }
    }

    #[test]
    fn insert_after_last_appends() {
        let mut b = block(&["X", "Y"]);
        assert!(b.insert_column(1, Position::After));
        assert_eq!(b.columns, vec!["X", "Y", ""]);
        assert_eq!(b.column_count(), 3);
    }

    #[test]
    fn insert_before_first_prepends() {
        let mut b = block(&["X", "Y"]);
        b.insert_column(0, Position::Before);
        assert_eq!(b.columns, vec!["", "X", "Y"]);
    }

    #[test]
    fn insert_past_end_is_clamped() {
        let mut b = block(&["X"]);
        b.insert_column(7, Position::After);
        assert_eq!(b.columns, vec!["X", ""]);
    }

    #[test]
    fn insert_resets_custom_widths() {
        let mut b = block(&["X", "Y"]);
        b.set_column_widths(&[70.0, 30.0]);
        b.insert_column(0, Position::After);
        assert_eq!(b.column_widths(), None);
        assert_invariants(&b);
    }

    #[test]
    fn remove_single_column_is_refused() {
        let mut b = block(&["only"]);
        let before = b.clone();
        assert!(!b.remove_column(0));
        assert_eq!(b, before);
    }

    #[test]
    fn remove_splices_and_resets_widths() {
        let mut b = block(&["a", "b", "c"]);
        b.set_column_widths(&[50.0, 25.0, 25.0]);
        assert!(b.remove_column(1));
        assert_eq!(b.columns, vec!["a", "c"]);
        assert_eq!(b.column_widths(), None);
        assert_invariants(&b);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut b = block(&["a", "b"]);
        assert!(!b.remove_column(2));
        assert_eq!(b.columns, vec!["a", "b"]);
    }

    #[test]
    fn reorder_moves_widths_with_columns() {
        let mut b = block(&["c0", "c1", "c2"]);
        b.config.column_widths = Some(vec![20.0, 30.0, 50.0]);

        assert!(b.reorder_column(0, 2));

        assert_eq!(b.columns, vec!["c1", "c2", "c0"]);
        assert_eq!(b.column_widths(), Some(&[30.0, 50.0, 20.0][..]));
    }

    #[test]
    fn reorder_without_widths_leaves_them_unset() {
        let mut b = block(&["a", "b", "c"]);
        b.reorder_column(2, 0);
        assert_eq!(b.columns, vec!["c", "a", "b"]);
        assert_eq!(b.column_widths(), None);
    }

    #[test]
    fn reorder_onto_self_is_noop() {
        let mut b = block(&["a", "b"]);
        assert!(!b.reorder_column(1, 1));
        assert_eq!(b.columns, vec!["a", "b"]);
    }

    #[rstest]
    #[case(&[50.05, 49.95], None)]
    #[case(&[50.9, 49.1], None)]
    #[case(&[70.0, 30.0], Some(vec![70.0, 30.0]))]
    #[case(&[51.5, 48.5], Some(vec![51.5, 48.5]))]
    fn widths_close_to_equal_split_are_not_stored(
        #[case] widths: &[f64],
        #[case] expected: Option<Vec<f64>>,
    ) {
        let mut b = block(&["a", "b"]);
        b.set_column_widths(widths);
        assert_eq!(b.config.column_widths, expected);
    }

    #[test]
    fn near_equal_widths_clear_previous_custom_widths() {
        let mut b = block(&["a", "b"]);
        b.set_column_widths(&[70.0, 30.0]);
        assert!(b.set_column_widths(&[50.2, 49.8]));
        assert_eq!(b.column_widths(), None);
    }

    #[test]
    fn wrong_length_widths_are_refused() {
        let mut b = block(&["a", "b"]);
        assert!(!b.set_column_widths(&[10.0, 20.0, 70.0]));
        assert_eq!(b.column_widths(), None);
    }

    #[test]
    fn set_column_count_grows_and_shrinks() {
        let mut b = block(&["a", "b"]);
        b.set_column_widths(&[80.0, 20.0]);

        b.set_column_count(4);
        assert_eq!(b.columns, vec!["a", "b", "", ""]);
        assert_eq!(b.column_widths(), None);

        b.set_column_count(1);
        assert_eq!(b.columns, vec!["a"]);

        b.set_column_count(0);
        assert_eq!(b.column_count(), 1);
        assert_invariants(&b);
    }

    #[test]
    fn mutation_truncates_surplus_parsed_columns() {
        let mut b = BlockInstance {
            config: BlockConfig {
                column_count: 2,
                column_widths: None,
            },
            columns: vec!["a".into(), "b".into(), "c".into()],
        };
        b.set_column_content(0, "A");
        assert_eq!(b.columns, vec!["A", "b"]);
    }

    #[test]
    fn effective_widths_default_to_equal_split() {
        let b = block(&["a", "b", "c", "d"]);
        assert_eq!(b.effective_widths(), vec![25.0; 4]);
    }

    #[test]
    fn count_invariant_holds_over_mutation_sequences() {
        let mut b = block(&["a", "b"]);
        let steps: Vec<Box<dyn Fn(&mut BlockInstance)>> = vec![
            Box::new(|b| {
                b.insert_column(0, Position::Before);
            }),
            Box::new(|b| {
                b.reorder_column(0, 2);
            }),
            Box::new(|b| {
                b.remove_column(1);
            }),
            Box::new(|b| {
                b.set_column_count(5);
            }),
            Box::new(|b| {
                b.set_column_widths(&[10.0, 10.0, 10.0, 10.0, 60.0]);
            }),
            Box::new(|b| {
                b.reorder_column(4, 0);
            }),
            Box::new(|b| {
                b.remove_column(0);
            }),
            Box::new(|b| {
                b.set_column_count(1);
            }),
            Box::new(|b| {
                b.remove_column(0);
            }),
        ];

        for step in steps {
            step(&mut b);
            assert_invariants(&b);
        }
        assert_eq!(b.column_count(), 1);
    }
}
