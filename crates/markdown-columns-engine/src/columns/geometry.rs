use serde::Serialize;

/// Narrowest a column may be dragged, in pixels of the rendered track.
pub const MIN_COLUMN_WIDTH_PX: f64 = 100.0;

/// Rendered extent of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnGeometry {
    pub index: usize,
    /// Share of the track in percent, normalized so all columns sum to 100.
    pub percent: f64,
    pub left_px: f64,
    pub width_px: f64,
}

impl ColumnGeometry {
    pub fn right_px(&self) -> f64 {
        self.left_px + self.width_px
    }
}

/// Lay out columns across a track `track_width_px` wide.
///
/// Stored widths need not sum to 100; they are scaled here for display only.
/// Negative or non-finite widths count as zero, and if nothing positive
/// remains every column gets an equal share.
pub fn layout(widths: &[f64], track_width_px: f64) -> Vec<ColumnGeometry> {
    if widths.is_empty() {
        return Vec::new();
    }

    let sanitized: Vec<f64> = widths
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let total: f64 = sanitized.iter().sum();
    let track = track_width_px.max(0.0);

    let mut left = 0.0;
    sanitized
        .iter()
        .enumerate()
        .map(|(index, w)| {
            let percent = if total > 0.0 {
                w / total * 100.0
            } else {
                100.0 / widths.len() as f64
            };
            let width_px = track * percent / 100.0;
            let geometry = ColumnGeometry {
                index,
                percent,
                left_px: left,
                width_px,
            };
            left += width_px;
            geometry
        })
        .collect()
}

/// Pixel x-positions of the dividers between adjacent columns.
pub fn divider_positions(geometry: &[ColumnGeometry]) -> Vec<f64> {
    geometry
        .iter()
        .take(geometry.len().saturating_sub(1))
        .map(ColumnGeometry::right_px)
        .collect()
}

/// [`MIN_COLUMN_WIDTH_PX`] as a percentage of the current track width.
///
/// Recomputed per gesture so stored widths stay resolution independent.
pub fn min_width_percent(track_width_px: f64) -> f64 {
    if track_width_px <= 0.0 || !track_width_px.is_finite() {
        return 0.0;
    }
    (MIN_COLUMN_WIDTH_PX / track_width_px * 100.0).min(100.0)
}
