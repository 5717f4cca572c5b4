use relative_path::RelativePath;
use uuid::Uuid;

use crate::columns::{BlockInstance, ColumnGeometry, divider_positions, layout};
use crate::render::{MarkdownRenderer, RenderOptions};

/// One rendered column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    /// Identity of this view for the lifetime of one build only.
    pub key: Uuid,
    pub index: usize,
    pub text: String,
    pub geometry: ColumnGeometry,
}

/// Layout of a whole block for one render.
///
/// Views are never patched across structural changes: after an add, remove
/// or reorder the caller builds a new one and every column gets a new key.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockView {
    pub columns: Vec<ColumnView>,
    /// x-position of each divider, in track pixels.
    pub dividers: Vec<f64>,
    pub options: RenderOptions,
    pub track_width_px: f64,
}

impl BlockView {
    pub fn build(instance: &BlockInstance, options: RenderOptions, track_width_px: f64) -> Self {
        let geometry = layout(&instance.effective_widths(), track_width_px);
        let dividers = divider_positions(&geometry);
        let columns = geometry
            .into_iter()
            .map(|geometry| ColumnView {
                key: Uuid::new_v4(),
                index: geometry.index,
                text: instance
                    .column(geometry.index)
                    .unwrap_or_default()
                    .to_string(),
                geometry,
            })
            .collect();

        Self {
            columns,
            dividers,
            options,
            track_width_px,
        }
    }

    /// Pick up text and width changes without touching column keys.
    ///
    /// Falls back to a full rebuild if the column count changed.
    pub fn refresh(&mut self, instance: &BlockInstance) {
        let geometry = layout(&instance.effective_widths(), self.track_width_px);
        if geometry.len() != self.columns.len() {
            *self = Self::build(instance, self.options, self.track_width_px);
            return;
        }
        self.dividers = divider_positions(&geometry);
        for (column, geometry) in self.columns.iter_mut().zip(geometry) {
            column.text = instance
                .column(geometry.index)
                .unwrap_or_default()
                .to_string();
            column.geometry = geometry;
        }
    }

    /// Rendered percentages, in column order.
    pub fn rendered_widths(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c.geometry.percent).collect()
    }

    /// The column whose extent contains `x`.
    pub fn column_at(&self, x: f64) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| x >= c.geometry.left_px && x < c.geometry.right_px())
            .map(|c| c.index)
    }

    /// The divider within `tolerance` pixels of `x`, nearest first.
    pub fn divider_at(&self, x: f64, tolerance: f64) -> Option<usize> {
        self.dividers
            .iter()
            .enumerate()
            .map(|(i, d)| (i, (d - x).abs()))
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Whether the remove button should be offered.
    pub fn can_remove(&self) -> bool {
        self.columns.len() > 1
    }

    /// Render the whole block with `renderer` for each column's markdown.
    pub fn to_html<R>(&self, renderer: &R, context_path: &RelativePath) -> String
    where
        R: MarkdownRenderer<Target = String>,
    {
        let mut class = String::from("columns-block");
        if self.options.show_column_borders {
            class.push_str(" columns-bordered");
        }

        let mut out = format!(
            "<div class=\"{class}\" style=\"--button-scale: {:.2}\">",
            self.options.button_size_scale
        );
        for column in &self.columns {
            if column.index > 0 {
                out.push_str(&format!(
                    "<div class=\"column-divider\" data-divider=\"{}\"></div>",
                    column.index - 1
                ));
            }
            out.push_str(&format!(
                "<div class=\"column\" data-key=\"{}\" data-index=\"{}\" style=\"flex-basis: {:.1}%\" draggable=\"true\">",
                column.key, column.index, column.geometry.percent
            ));
            renderer.render(&column.text, &mut out, context_path);
            out.push_str(&format!(
                "<button class=\"column-add\" data-index=\"{}\" data-position=\"before\">+</button>",
                column.index
            ));
            out.push_str(&format!(
                "<button class=\"column-add\" data-index=\"{}\" data-position=\"after\">+</button>",
                column.index
            ));
            if self.can_remove() {
                out.push_str(&format!(
                    "<button class=\"column-remove\" data-index=\"{}\">×</button>",
                    column.index
                ));
            }
            out.push_str("</div>");
        }
        out.push_str("</div>");
        out
    }
}
