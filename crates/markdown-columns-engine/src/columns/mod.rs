//! # Column Blocks
//!
//! The text format and in-memory model of a multi-column block.
//!
//! ## Block Text Format
//!
//! ```text
//! columns: 2
//! columnWidths: 70.0,30.0
//! ===column===
//! left column markdown
//! ===column===
//! right column markdown
//! ```
//!
//! Header lines before the first column marker are `key: value` pairs. Every
//! line after a marker belongs verbatim to the current column.
//!
//! ## Modules
//!
//! - **`model`**: `BlockConfig` / `BlockInstance` and the mutation operations
//!   that keep column count and widths consistent
//! - **`parser`**: lenient text → model parsing (never fails)
//! - **`serializer`**: model → text, the inverse of `parser`
//! - **`geometry`**: derived per-column percentages and pixel extents
//!
//! ## Key Invariants
//!
//! - After any mutation `columns.len() == config.column_count`
//! - Stored widths, when present, have exactly `column_count` entries
//! - `parse(serialize(b))` reproduces the count and the column texts

pub mod geometry;
pub mod model;
pub mod parser;
pub mod serializer;

pub use geometry::{
    ColumnGeometry, MIN_COLUMN_WIDTH_PX, divider_positions, layout, min_width_percent,
};
pub use model::{BlockConfig, BlockInstance, DEFAULT_COLUMN_COUNT, Position};
pub use parser::{COLUMN_MARKER, parse};
pub use serializer::serialize;
