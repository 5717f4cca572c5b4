use super::{model::BlockInstance, parser::COLUMN_MARKER};

/// Serialize a block back into its text form.
///
/// Widths are written with one decimal place. The final newline is dropped
/// so that wrapping the text in a fence leaves no extra blank line before the
/// closing delimiter.
pub fn serialize(instance: &BlockInstance) -> String {
    let mut out = format!("columns: {}\n", instance.config.column_count);

    if let Some(widths) = &instance.config.column_widths {
        let widths = widths
            .iter()
            .map(|w| format!("{w:.1}"))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("columnWidths: {widths}\n"));
    }

    for column in &instance.columns {
        out.push_str(COLUMN_MARKER);
        out.push('\n');
        out.push_str(column);
        if !column.is_empty() && !column.ends_with('\n') {
            out.push('\n');
        }
    }

    if out.ends_with('\n') {
        out.pop();
    }
    out
}
