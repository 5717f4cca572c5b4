use crate::columns::min_width_percent;

/// State captured for one divider drag.
///
/// Only the two columns adjacent to the divider change; every other rendered
/// width is carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDrag {
    /// Index of the column left of the dragged divider.
    divider: usize,
    start_x: f64,
    track_width_px: f64,
    /// All rendered percentage widths when the drag started.
    start_widths: Vec<f64>,
    /// Lower bound for either neighbour, in percent of the track.
    min_percent: f64,
    left: f64,
    right: f64,
}

impl ResizeDrag {
    /// Start dragging the divider between `divider` and `divider + 1`.
    ///
    /// Returns `None` when there is no such divider or the inputs are not
    /// usable measurements.
    pub fn start(
        divider: usize,
        pointer_x: f64,
        rendered_widths: &[f64],
        track_width_px: f64,
    ) -> Option<Self> {
        if divider + 1 >= rendered_widths.len()
            || !pointer_x.is_finite()
            || !track_width_px.is_finite()
            || track_width_px <= 0.0
            || rendered_widths.iter().any(|w| !w.is_finite() || *w < 0.0)
        {
            return None;
        }

        let left = rendered_widths[divider];
        let right = rendered_widths[divider + 1];
        // Two minimum-width columns must always fit in the pair.
        let min_percent = min_width_percent(track_width_px).min((left + right) / 2.0);

        Some(Self {
            divider,
            start_x: pointer_x,
            track_width_px,
            start_widths: rendered_widths.to_vec(),
            min_percent,
            left,
            right,
        })
    }

    pub fn divider(&self) -> usize {
        self.divider
    }

    /// Apply a pointer move, returning the new `(left, right)` widths.
    pub fn update(&mut self, pointer_x: f64) -> (f64, f64) {
        if !pointer_x.is_finite() {
            return (self.left, self.right);
        }

        let delta = (pointer_x - self.start_x) / self.track_width_px * 100.0;
        let left_start = self.start_widths[self.divider];
        let pair = left_start + self.start_widths[self.divider + 1];

        let left = (left_start + delta).clamp(self.min_percent, pair - self.min_percent);
        self.left = left;
        self.right = pair - left;
        (self.left, self.right)
    }

    /// Every rendered width with the two dragged neighbours replaced.
    pub fn widths(&self) -> Vec<f64> {
        let mut widths = self.start_widths.clone();
        widths[self.divider] = self.left;
        widths[self.divider + 1] = self.right;
        widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn drag_moves_width_between_neighbours() {
        let mut drag = ResizeDrag::start(0, 500.0, &[50.0, 50.0], 1000.0).unwrap();
        let (left, right) = drag.update(700.0);
        assert!(close(left, 70.0));
        assert!(close(right, 30.0));
    }

    #[test]
    fn far_columns_are_untouched() {
        let mut drag = ResizeDrag::start(1, 400.0, &[20.0, 30.0, 50.0], 1000.0).unwrap();
        drag.update(300.0);
        let widths = drag.widths();
        assert_eq!(widths[0], 20.0);
        assert!(close(widths[1], 20.0));
        assert!(close(widths[2], 60.0));
    }

    #[test]
    fn drag_is_clamped_to_minimum_width() {
        // 100px of a 1000px track is 10%.
        let mut drag = ResizeDrag::start(0, 500.0, &[50.0, 50.0], 1000.0).unwrap();
        let (left, right) = drag.update(2000.0);
        assert!(close(left, 90.0));
        assert!(close(right, 10.0));

        let (left, right) = drag.update(-2000.0);
        assert!(close(left, 10.0));
        assert!(close(right, 90.0));
    }

    #[test]
    fn narrow_track_keeps_pair_balanced() {
        // Minimum (100px of 150px) exceeds half the pair, so both stay at 50%.
        let mut drag = ResizeDrag::start(0, 75.0, &[50.0, 50.0], 150.0).unwrap();
        let (left, right) = drag.update(140.0);
        assert!(close(left, 50.0));
        assert!(close(right, 50.0));
    }

    #[test]
    fn invalid_divider_is_rejected() {
        assert!(ResizeDrag::start(1, 0.0, &[50.0, 50.0], 1000.0).is_none());
        assert!(ResizeDrag::start(0, 0.0, &[100.0], 1000.0).is_none());
        assert!(ResizeDrag::start(0, 0.0, &[50.0, 50.0], 0.0).is_none());
    }
}
