//! Conversion from byte offsets to line/column locations.
//!
//! Location tracking is off by default for performance; when the caller
//! asks for it, a `LineIndex` is built once per source text and shared
//! by every lookup.

use crate::text::{LineCol, TextPos};
use memchr::memchr_iter;

/// An index of line-break positions in a source text.
///
/// Lines are 1-based, columns 0-based, matching the location convention
/// of the Mozilla Parser API output tree.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the first character of each line. line_starts[0] == 0.
    line_starts: Vec<TextPos>,
}

impl LineIndex {
    /// Build a line index for the given source text.
    ///
    /// A `\r\n` pair counts as a single line break; lone `\r` and `\n`
    /// each count as one.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0u32];
        for pos in memchr_iter(b'\n', bytes) {
            line_starts.push(pos as u32 + 1);
        }
        // Lone carriage returns (old-Mac line endings) also break lines.
        for pos in memchr_iter(b'\r', bytes) {
            if bytes.get(pos + 1) != Some(&b'\n') {
                line_starts.push(pos as u32 + 1);
            }
        }
        line_starts.sort_unstable();
        Self { line_starts }
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset at which the given 1-based line starts.
    pub fn line_start(&self, line: u32) -> Option<TextPos> {
        self.line_starts.get(line as usize - 1).copied()
    }

    /// Convert a byte offset to a 1-based line / 0-based column pair.
    ///
    /// Offsets past the last line break land on the final line; the
    /// column is a byte distance from the line start, which matches the
    /// character distance for ASCII source.
    pub fn line_col(&self, pos: TextPos) -> LineCol {
        let line_idx = match self.line_starts.binary_search(&pos) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        LineCol {
            line: line_idx as u32 + 1,
            column: pos - self.line_starts[line_idx],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let index = LineIndex::new("hello");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 0 });
        assert_eq!(index.line_col(4), LineCol { line: 1, column: 4 });
    }

    #[test]
    fn test_multiple_lines() {
        let index = LineIndex::new("ab\ncd\nef");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_col(0), LineCol { line: 1, column: 0 });
        assert_eq!(index.line_col(2), LineCol { line: 1, column: 2 });
        assert_eq!(index.line_col(3), LineCol { line: 2, column: 0 });
        assert_eq!(index.line_col(7), LineCol { line: 3, column: 1 });
    }

    #[test]
    fn test_crlf() {
        let index = LineIndex::new("ab\r\ncd");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_col(4), LineCol { line: 2, column: 0 });
    }

    #[test]
    fn test_lone_cr() {
        let index = LineIndex::new("ab\rcd");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_col(3), LineCol { line: 2, column: 0 });
    }
}
