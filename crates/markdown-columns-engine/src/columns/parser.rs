use super::model::{BlockConfig, BlockInstance, DEFAULT_COLUMN_COUNT};

/// Line that starts a new column.
pub const COLUMN_MARKER: &str = "===column===";

/// Header values collected before the first column marker.
#[derive(Debug, Default)]
struct Header {
    columns: Option<usize>,
    column_widths: Option<Vec<f64>>,
}

impl Header {
    /// Reads one `key: value` line. Anything unrecognized is ignored.
    fn read_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            return;
        };
        let value = value.trim();

        match key.trim() {
            "columns" => {
                if let Ok(n) = value.parse::<usize>()
                    && n >= 1
                {
                    self.columns = Some(n);
                }
            }
            "columnWidths" => {
                let widths: Vec<f64> = value
                    .split(',')
                    .filter_map(|token| token.trim().parse::<f64>().ok())
                    .filter(|w| w.is_finite())
                    .collect();
                self.column_widths = (!widths.is_empty()).then_some(widths);
            }
            _ => {}
        }
    }

    fn into_config(self) -> BlockConfig {
        let column_count = self.columns.unwrap_or(DEFAULT_COLUMN_COUNT);
        let column_widths = match self.column_widths {
            Some(widths) if widths.len() == column_count => Some(widths),
            Some(widths) => {
                log::debug!(
                    "ignoring {} column widths for {column_count} columns",
                    widths.len()
                );
                None
            }
            None => None,
        };
        BlockConfig {
            column_count,
            column_widths,
        }
    }
}

/// Parse block text into a [`BlockInstance`].
///
/// Never fails: malformed header values fall back to defaults, and content
/// outside any recognizable structure is dropped from the header. Surplus
/// columns beyond the declared count are kept until the first mutation.
pub fn parse(source: &str) -> BlockInstance {
    let mut header = Header::default();
    let mut columns: Vec<String> = Vec::new();

    for line in source_lines(source) {
        if line.starts_with(COLUMN_MARKER) {
            columns.push(String::new());
            continue;
        }
        match columns.last_mut() {
            Some(column) => {
                column.push_str(line);
                column.push('\n');
            }
            None => header.read_line(line),
        }
    }

    for column in &mut columns {
        collapse_trailing_newlines(column);
    }

    let config = header.into_config();
    while columns.len() < config.column_count {
        columns.push(String::new());
    }

    BlockInstance { config, columns }
}

/// Lines of `source` without their `\n`. A terminating newline does not
/// produce a trailing empty line.
fn source_lines(source: &str) -> impl Iterator<Item = &str> {
    source
        .split_inclusive('\n')
        .map(|line| line.strip_suffix('\n').unwrap_or(line))
}

/// Collapse three or more trailing newlines down to two.
fn collapse_trailing_newlines(text: &mut String) {
    let trailing = text.len() - text.trim_end_matches('\n').len();
    if trailing > 2 {
        text.truncate(text.len() - (trailing - 2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_three_equal_columns() {
        let b = parse("columns: 3\n===column===\nA\n===column===\nB\n===column===\nC\n");
        assert_eq!(b.config.column_count, 3);
        assert_eq!(b.columns, vec!["A\n", "B\n", "C\n"]);
        assert_eq!(b.config.column_widths, None);
    }

    #[test]
    fn parses_column_widths() {
        let b = parse("columns: 2\ncolumnWidths: 70,30\n===column===\nfoo\n===column===\nbar");
        assert_eq!(b.config.column_widths, Some(vec![70.0, 30.0]));
        assert_eq!(b.columns, vec!["foo\n", "bar\n"]);
    }

    #[test]
    fn non_numeric_width_tokens_are_dropped() {
        let b = parse("columns: 2\ncolumnWidths: 60, wide ,40\n===column===\n===column===\n");
        assert_eq!(b.config.column_widths, Some(vec![60.0, 40.0]));
    }

    #[test]
    fn mismatched_width_count_falls_back_to_equal_split() {
        let b = parse("columns: 3\ncolumnWidths: 60,40\n===column===\n");
        assert_eq!(b.config.column_widths, None);
    }

    #[test]
    fn header_order_does_not_matter() {
        let b = parse("columnWidths: 25,75\ncolumns: 2\n===column===\n===column===\n");
        assert_eq!(b.config.column_count, 2);
        assert_eq!(b.config.column_widths, Some(vec![25.0, 75.0]));
    }

    #[rstest]
    #[case("")]
    #[case("columns: lots\n")]
    #[case("columns: 0\n")]
    #[case("columns: -3\n")]
    #[case("just some text\nwithout any header\n")]
    fn malformed_input_degrades_to_two_empty_columns(#[case] source: &str) {
        let b = parse(source);
        assert_eq!(b.config.column_count, 2);
        assert_eq!(b.columns, vec!["", ""]);
    }

    #[test]
    fn key_value_lines_inside_columns_are_content() {
        let b = parse("columns: 1\n===column===\ncolumns: 9\ntitle: Notes\n");
        assert_eq!(b.config.column_count, 1);
        assert_eq!(b.columns, vec!["columns: 9\ntitle: Notes\n"]);
    }

    #[test]
    fn marker_must_start_the_line() {
        let b = parse("columns: 1\n===column===\nsee ===column=== here\n");
        assert_eq!(b.columns, vec!["see ===column=== here\n"]);
    }

    #[test]
    fn marker_tolerates_trailing_whitespace() {
        let b = parse("columns: 2\n===column===  \nA\n===column===\r\nB");
        assert_eq!(b.columns, vec!["A\n", "B\n"]);
    }

    #[test]
    fn missing_columns_are_padded() {
        let b = parse("columns: 4\n===column===\nonly one\n");
        assert_eq!(b.columns, vec!["only one\n", "", "", ""]);
    }

    #[test]
    fn surplus_columns_are_kept_at_parse_time() {
        let b = parse("columns: 1\n===column===\na\n===column===\nb\n");
        assert_eq!(b.config.column_count, 1);
        assert_eq!(b.columns, vec!["a\n", "b\n"]);
    }

    #[test]
    fn blank_lines_inside_columns_are_preserved() {
        let b = parse("columns: 1\n===column===\n# Title\n\nBody\n\n===column===\n");
        assert_eq!(b.columns[0], "# Title\n\nBody\n\n");
    }

    #[test]
    fn runaway_trailing_newlines_collapse_to_two() {
        let b = parse("columns: 2\n===column===\nA\n\n\n\n\n===column===\nB\n");
        assert_eq!(b.columns, vec!["A\n\n", "B\n"]);
    }

    #[test]
    fn wikilinks_are_opaque_content() {
        let b = parse("columns: 1\n===column===\nSee [[Project Plan|the plan]]\n");
        assert_eq!(b.columns, vec!["See [[Project Plan|the plan]]\n"]);
    }
}
