//! Byte offset to line/column conversion.
//!
//! rustpython-parser 0.3 reports positions as byte offsets via the `Ranged`
//! trait; warnings want `line:col`, so each extracted module keeps a line
//! index over its source text.

use rustpython_parser::ast::Ranged;

/// Line index for fast byte offset to line/column conversion.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    /// Byte offsets where each line starts.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Create a line index from source text.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-indexed line and 0-indexed column.
    pub fn position(&self, offset: usize) -> (usize, usize) {
        if self.line_starts.is_empty() {
            return (1, offset);
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let column = offset.saturating_sub(self.line_starts[line]);
        (line + 1, column)
    }

    /// Position of the start of an AST node.
    pub fn locate<T: Ranged>(&self, node: &T) -> (usize, usize) {
        self.position(node.range().start().to_usize())
    }
}
