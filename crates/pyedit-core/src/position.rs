use crate::PositionError;
use serde::{Deserialize, Serialize};

/// Position in a buffer.
///
/// `line` is 1-based, with `0` reserved as the "unknown/unresolved" sentinel.
/// `column` is a 0-based byte index into the line, which is what both the analysis
/// engine and the linter report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Sentinel for a location the engine could not resolve
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.line != 0
    }
}

/// Range in a buffer. A missing `end` means "to the end of the token", which
/// renders as a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Option<Position>,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    #[must_use]
    pub const fn point(start: Position) -> Self {
        Self { start, end: None }
    }

    /// End position with the one-column default applied
    #[must_use]
    pub fn resolved_end(&self) -> Position {
        self.end
            .unwrap_or(Position::new(self.start.line, self.start.column + 1))
    }
}

/// Fast line-to-offset and offset-to-line conversion using a pre-built index.
///
/// # Performance
///
/// - Build time: O(N) where N is the length of the source text
/// - Lookup time: O(1) for `position_to_offset`
/// - Lookup time: O(log L) for `offset_to_position` (binary search)
///
/// # Example
///
/// ```
/// use pyedit_core::{LineIndex, Position};
///
/// let index = LineIndex::new("import os\nos.getcwd()\n");
///
/// assert_eq!(index.position_to_offset(Position::new(2, 3)), Ok(13));
/// assert_eq!(index.offset_to_position(13), Position::new(2, 3));
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line; index 0 is always 0
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(offset, _)| offset + 1),
        );

        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Convert a 1-based line / 0-based column position to a byte offset.
    ///
    /// The column may point at the line terminator (end of line) but not beyond it.
    pub fn position_to_offset(&self, position: Position) -> Result<usize, PositionError> {
        let line_start = position
            .line
            .checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx))
            .copied()
            .ok_or(PositionError::LineOutOfRange {
                line: position.line,
                line_count: self.line_count(),
            })?;

        let line_len = self.line_end(position.line - 1) - line_start;
        if position.column > line_len {
            return Err(PositionError::ColumnOutOfRange {
                line: position.line,
                column: position.column,
                line_len,
            });
        }

        Ok(line_start + position.column)
    }

    /// Like [`position_to_offset`](Self::position_to_offset), but a column past the line
    /// end snaps to it and a line past the last one snaps to the end of the text.
    #[must_use]
    pub fn clamped_offset(&self, position: Position) -> usize {
        match position.line.checked_sub(1) {
            Some(idx) if idx < self.line_starts.len() => {
                (self.line_starts[idx] + position.column).min(self.line_end(idx))
            }
            Some(_) => self.len,
            None => 0,
        }
    }

    /// Convert a byte offset to a position. Offsets past the end clamp to the end.
    #[must_use]
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };

        Position {
            line: idx + 1,
            column: offset - self.line_starts[idx],
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset of the start of a 1-based line
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|idx| self.line_starts.get(idx))
            .copied()
    }

    /// Text of a 1-based line without its terminator
    #[must_use]
    pub fn line_text<'a>(&self, text: &'a str, line: usize) -> Option<&'a str> {
        let start = self.line_start(line)?;
        let end = self.line_end(line - 1);
        text.get(start..end).map(|line| line.strip_suffix('\r').unwrap_or(line))
    }

    /// Offset of the line terminator for a 0-based line index (or end of text)
    fn line_end(&self, idx: usize) -> usize {
        self.line_starts
            .get(idx + 1)
            .map_or(self.len, |next| next - 1)
    }
}

#[must_use]
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    LineIndex::new(text).offset_to_position(offset)
}

pub fn position_to_offset(text: &str, position: Position) -> Result<usize, PositionError> {
    LineIndex::new(text).position_to_offset(position)
}

/// Character count of the first `column` bytes of `line`.
///
/// The analysis engine counts columns in characters; buffers count them in bytes.
#[must_use]
pub fn byte_to_char_column(line: &str, column: usize) -> usize {
    let chars = line.char_indices().take_while(|(i, _)| *i < column).count();
    chars + column.saturating_sub(line.len())
}

/// Byte offset of character `column` within `line`. Columns past the end keep
/// their distance from the line end.
#[must_use]
pub fn char_to_byte_column(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or_else(|| line.len() + column.saturating_sub(line.chars().count()), |(i, _)| i)
}

/// Byte bounds of the identifier touching `offset`, if any.
///
/// Used to pick the word under the pointer for the hover underline.
#[must_use]
pub fn word_at(text: &str, offset: usize) -> Option<(usize, usize)> {
    if offset > text.len() || !text.is_char_boundary(offset) {
        return None;
    }

    let is_ident = |c: char| c == '_' || c.is_alphanumeric();

    let start = text[..offset]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_ident(*c))
        .last()
        .map_or(offset, |(i, _)| i);
    let end = text[offset..]
        .char_indices()
        .find(|(_, c)| !is_ident(*c))
        .map_or(text.len(), |(i, _)| offset + i);

    (start < end).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.position_to_offset(Position::new(1, 0)), Ok(0));
        assert_eq!(index.offset_to_position(0), Position::new(1, 0));
    }

    #[test]
    fn test_multiple_lines() {
        let source = "line 0\nline 1\nline 2";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.position_to_offset(Position::new(1, 0)), Ok(0));
        assert_eq!(index.position_to_offset(Position::new(2, 0)), Ok(7));
        assert_eq!(index.position_to_offset(Position::new(3, 0)), Ok(14));
        assert_eq!(index.position_to_offset(Position::new(2, 5)), Ok(12));
    }

    #[test]
    fn test_offset_to_position() {
        let index = LineIndex::new("line 0\nline 1\nline 2");

        assert_eq!(index.offset_to_position(0), Position::new(1, 0));
        // The newline itself belongs to the line it terminates
        assert_eq!(index.offset_to_position(6), Position::new(1, 6));
        assert_eq!(index.offset_to_position(7), Position::new(2, 0));
        assert_eq!(index.offset_to_position(10), Position::new(2, 3));
        assert_eq!(index.offset_to_position(20), Position::new(3, 6));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.offset_to_position(99), Position::new(2, 2));
    }

    #[test]
    fn test_out_of_range() {
        let index = LineIndex::new("line 0\nline 1");

        assert_eq!(
            index.position_to_offset(Position::new(10, 0)),
            Err(PositionError::LineOutOfRange {
                line: 10,
                line_count: 2
            })
        );
        assert!(matches!(
            index.position_to_offset(Position::UNKNOWN),
            Err(PositionError::LineOutOfRange { line: 0, .. })
        ));
        assert_eq!(
            index.position_to_offset(Position::new(1, 7)),
            Err(PositionError::ColumnOutOfRange {
                line: 1,
                column: 7,
                line_len: 6
            })
        );
    }

    #[test]
    fn test_clamped_offset() {
        let index = LineIndex::new("print(1\nx\n");
        assert_eq!(index.clamped_offset(Position::new(1, 3)), 3);
        assert_eq!(index.clamped_offset(Position::new(1, 8)), 7);
        assert_eq!(index.clamped_offset(Position::new(2, 40)), 9);
        assert_eq!(index.clamped_offset(Position::new(7, 0)), 10);
        assert_eq!(index.clamped_offset(Position::UNKNOWN), 0);
    }

    #[test]
    fn test_trailing_newline_has_empty_last_line() {
        let index = LineIndex::new("x = 1\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.position_to_offset(Position::new(2, 0)), Ok(6));
        assert!(index.position_to_offset(Position::new(2, 1)).is_err());
    }

    #[test]
    fn test_windows_line_endings() {
        let index = LineIndex::new("line 0\r\nline 1\r\nline 2");
        assert_eq!(index.position_to_offset(Position::new(2, 0)), Ok(8));
        assert_eq!(index.position_to_offset(Position::new(3, 0)), Ok(16));
    }

    #[test]
    fn test_utf8_columns_are_bytes() {
        let source = "s = \"世界\"\nprint(s)";
        let index = LineIndex::new(source);
        assert_eq!(index.line_start(2), Some(13));
        assert_eq!(index.offset_to_position(13), Position::new(2, 0));
    }

    #[test]
    fn test_roundtrip_every_offset() {
        let sources = [
            "",
            "no line breaks at all",
            "def f(x):\n    return x\n",
            "\n\n\n",
            "a\r\nb\r\n",
            "# 注释\nvalue = '世界'\n",
        ];

        for source in sources {
            let index = LineIndex::new(source);
            for offset in 0..=source.len() {
                let position = index.offset_to_position(offset);
                assert_eq!(
                    index.position_to_offset(position),
                    Ok(offset),
                    "{source:?}: offset {offset} -> {position:?}"
                );
                assert_eq!(
                    position_to_offset(source, offset_to_position(source, offset)),
                    Ok(offset)
                );
            }
        }
    }

    #[test]
    fn test_range_resolved_end() {
        let point = Range::point(Position::new(3, 4));
        assert_eq!(point.resolved_end(), Position::new(3, 5));

        let span = Range::new(Position::new(3, 4), Position::new(4, 0));
        assert_eq!(span.resolved_end(), Position::new(4, 0));
    }

    #[test]
    fn test_line_text() {
        let source = "first\r\nsecond\nlast";
        let index = LineIndex::new(source);
        assert_eq!(index.line_text(source, 1), Some("first"));
        assert_eq!(index.line_text(source, 2), Some("second"));
        assert_eq!(index.line_text(source, 3), Some("last"));
        assert_eq!(index.line_text(source, 4), None);
        assert_eq!(index.line_text(source, 0), None);
    }

    #[test]
    fn test_char_and_byte_columns() {
        let line = "s = \"世界世界\"; print(msg)";
        assert_eq!(byte_to_char_column(line, 26), 18);
        assert_eq!(char_to_byte_column(line, 18), 26);
        // ASCII prefix is unchanged
        assert_eq!(byte_to_char_column(line, 4), 4);
        assert_eq!(char_to_byte_column(line, 4), 4);
        // End of line and beyond
        assert_eq!(char_to_byte_column(line, 22), line.len());
        assert_eq!(byte_to_char_column(line, line.len()), 22);
        assert_eq!(char_to_byte_column(line, 24), line.len() + 2);
        assert_eq!(byte_to_char_column(line, line.len() + 2), 24);
    }

    #[test]
    fn test_word_at() {
        let text = "result = compute_total(items)";
        assert_eq!(word_at(text, 0), Some((0, 6)));
        assert_eq!(word_at(text, 3), Some((0, 6)));
        // Offset just after an identifier still touches it
        assert_eq!(word_at(text, 6), Some((0, 6)));
        assert_eq!(word_at(text, 12), Some((9, 22)));
        assert_eq!(word_at(text, 7), None);
        assert_eq!(word_at(text, text.len()), None);
        assert_eq!(word_at(text, 100), None);
    }
}
