//! Source code location types

/// Maps byte offsets of one source buffer to line numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset at which every line starts
    line_starts: Vec<usize>,
    /// Total length of the indexed text
    len: usize,
}

impl LineIndex {
    /// Index the line starts of `text`
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Line number (1-based) containing `offset`. Offsets past the end map to
    /// the last line.
    pub fn line_of(&self, offset: usize) -> usize {
        self.row_of(offset) + 1
    }

    /// Row (0-based) and byte column of `offset`
    pub fn point_of(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len);
        let row = self.row_of(offset);
        (row, offset - self.line_starts[row])
    }

    /// Byte offset at which line `line` (1-based) starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|row| self.line_starts.get(row))
            .copied()
    }

    /// Number of lines in the text
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    fn row_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let index = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 1);
        assert_eq!(index.line_of(3), 2);
        assert_eq!(index.line_of(6), 3);
        assert_eq!(index.line_of(7), 4);
        assert_eq!(index.line_of(100), 4);
        assert_eq!(index.line_count(), 4);
    }

    #[test]
    fn test_point_of() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.point_of(0), (0, 0));
        assert_eq!(index.point_of(4), (1, 1));
        assert_eq!(index.point_of(5), (1, 2));
        assert_eq!(index.line_start(2), Some(3));
        assert_eq!(index.line_start(0), None);
    }
}
