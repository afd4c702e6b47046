//! Source text positions and ranges.

use std::fmt;

pub use text_size::TextRange;
pub use text_size::TextSize;

use super::FileId;

/// A source location: a byte range inside one module file.
///
/// Diagnostics and dependency records are attributed to a `Loc`; the line
/// and column are only computed when a diagnostic is rendered.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Loc {
    pub file: FileId,
    pub range: TextRange,
}

impl Loc {
    #[inline]
    pub const fn new(file: FileId, range: TextRange) -> Self {
        Self { file, range }
    }

    /// A location with no extent at the start of `file`.
    pub fn start_of(file: FileId) -> Self {
        Self::new(file, TextRange::empty(TextSize::from(0)))
    }
}

/// A line and column position in source text.
///
/// Both line and column are 0-indexed internally, but displayed as 1-indexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct LineCol {
    /// 0-indexed line number
    pub line: u32,
    /// 0-indexed column (in UTF-8 bytes, not characters)
    pub col: u32,
}

impl LineCol {
    #[inline]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    #[inline]
    pub const fn line_one_indexed(self) -> u32 {
        self.line + 1
    }

    #[inline]
    pub const fn col_one_indexed(self) -> u32 {
        self.col + 1
    }
}

impl fmt::Debug for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

impl fmt::Display for LineCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_one_indexed(), self.col_one_indexed())
    }
}

/// Index for converting byte offsets into line/column positions.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Build a line index from source text.
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];

        for (offset, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(TextSize::from((offset + 1) as u32));
            }
        }

        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);

        let line_start = self.line_starts.get(line).copied().unwrap_or_default();
        let col = offset.checked_sub(line_start).unwrap_or_default();

        LineCol {
            line: line as u32,
            col: col.into(),
        }
    }

    /// Get the number of lines.
    pub fn len(&self) -> usize {
        self.line_starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_starts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_display() {
        assert_eq!(LineCol::new(0, 0).to_string(), "1:1");
        assert_eq!(LineCol::new(5, 10).to_string(), "6:11");
    }

    #[test]
    fn test_line_index_multi_line() {
        let index = LineIndex::new("module a;\nimport b;\n");

        assert_eq!(index.line_col(TextSize::from(0)), LineCol::new(0, 0));
        assert_eq!(index.line_col(TextSize::from(7)), LineCol::new(0, 7));
        assert_eq!(index.line_col(TextSize::from(10)), LineCol::new(1, 0));
        assert_eq!(index.line_col(TextSize::from(17)), LineCol::new(1, 7));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_loc_start_of() {
        let loc = Loc::start_of(FileId::new(4));
        assert_eq!(loc.file, FileId::new(4));
        assert!(loc.range.is_empty());
    }
}
