// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_block_text(columns: usize, lines_per_column: usize) -> String {
    let mut text = format!("columns: {columns}\n");
    for column in 0..columns {
        text.push_str("===column===\n");
        for line in 0..lines_per_column {
            text.push_str(&format!("- item {column}.{line} with [[Link {line}]]\n"));
        }
    }
    text
}

#[allow(dead_code)]
pub fn generate_document(blocks: usize) -> String {
    let mut doc = String::new();
    for i in 0..blocks {
        doc.push_str(&format!("# Section {i}\n\nParagraph with some content.\n\n"));
        doc.push_str("```columns\n");
        doc.push_str(&generate_block_text(3, 10));
        doc.push_str("```\n\n");
    }
    doc
}
