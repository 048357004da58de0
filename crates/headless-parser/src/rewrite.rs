//! Offset-based rewriting
//!
//! Edits are recorded against offsets of the original source and applied in
//! one pass, so earlier edits never invalidate the offsets of later ones.

use thiserror::Error;

/// A single replacement of `original[start..end]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    fn delta(&self) -> isize {
        self.replacement.len() as isize - (self.end - self.start) as isize
    }
}

/// Reasons an edit is refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("edit {start}..{end} is inverted")]
    Inverted { start: usize, end: usize },

    #[error("edit {start}..{end} overlaps the previous edit ending at {previous_end}")]
    Overlap {
        start: usize,
        end: usize,
        previous_end: usize,
    },

    #[error("edit {start}..{end} is out of bounds for a source of {len} bytes")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("offset {0} is not on a character boundary")]
    CharBoundary(usize),
}

/// Sorted, non-overlapping list of edits over one source buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    edits: Vec<Edit>,
}

impl EditScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `source[start..end]` with `replacement`.
    ///
    /// Edits must arrive in non-decreasing order of position and must not
    /// overlap; `source` is only used for bounds and boundary checks.
    pub fn replace(
        &mut self,
        source: &str,
        start: usize,
        end: usize,
        replacement: impl Into<String>,
    ) -> Result<(), EditError> {
        if start > end {
            return Err(EditError::Inverted { start, end });
        }
        if end > source.len() {
            return Err(EditError::OutOfBounds {
                start,
                end,
                len: source.len(),
            });
        }
        for offset in [start, end] {
            if !source.is_char_boundary(offset) {
                return Err(EditError::CharBoundary(offset));
            }
        }
        if let Some(previous) = self.edits.last() {
            if start < previous.end {
                return Err(EditError::Overlap {
                    start,
                    end,
                    previous_end: previous.end,
                });
            }
        }
        self.edits.push(Edit {
            start,
            end,
            replacement: replacement.into(),
        });
        Ok(())
    }

    /// Insert `text` at `offset`
    pub fn insert(
        &mut self,
        source: &str,
        offset: usize,
        text: impl Into<String>,
    ) -> Result<(), EditError> {
        self.replace(source, offset, offset, text)
    }

    /// Remove `source[start..end]`
    pub fn remove(&mut self, source: &str, start: usize, end: usize) -> Result<(), EditError> {
        self.replace(source, start, end, "")
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every edit to `original`, last edit first
    pub fn apply(&self, original: &str) -> String {
        let mut text = original.to_string();
        for edit in self.edits.iter().rev() {
            text.replace_range(edit.start..edit.end, &edit.replacement);
        }
        text
    }

    /// Map an offset of the edited text back to the original source.
    ///
    /// Offsets inside a replacement map to the start of the replaced range.
    pub fn original_offset(&self, modified: usize) -> usize {
        let mut delta: isize = 0;
        for edit in &self.edits {
            let start_in_modified = (edit.start as isize + delta) as usize;
            if modified < start_in_modified {
                break;
            }
            let end_in_modified = start_in_modified + edit.replacement.len();
            if modified < end_in_modified {
                return edit.start;
            }
            delta += edit.delta();
        }
        (modified as isize - delta).max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "int f() { return 1; }\nint x = 2;\n";

    #[test]
    fn test_apply_in_reverse() {
        let mut script = EditScript::new();
        script.replace(SOURCE, 7, 21, ";").unwrap();
        script.insert(SOURCE, 22, "extern ").unwrap();
        script.remove(SOURCE, 27, 31).unwrap();
        assert_eq!(script.apply(SOURCE), "int f();\nextern int x;\n");
        assert_eq!(script.len(), 3);
    }

    #[test]
    fn test_rejects_overlap_and_disorder() {
        let mut script = EditScript::new();
        script.replace(SOURCE, 7, 21, ";").unwrap();
        assert_eq!(
            script.replace(SOURCE, 10, 12, ""),
            Err(EditError::Overlap {
                start: 10,
                end: 12,
                previous_end: 21
            })
        );
        assert_eq!(
            script.replace(SOURCE, 0, 1, ""),
            Err(EditError::Overlap {
                start: 0,
                end: 1,
                previous_end: 21
            })
        );
        assert_eq!(script.len(), 1);
    }

    #[test]
    fn test_adjacent_edits_allowed() {
        let mut script = EditScript::new();
        script.insert(SOURCE, 22, "extern ").unwrap();
        script.insert(SOURCE, 22, "/*x*/").unwrap();
        script.replace(SOURCE, 22, 25, "long").unwrap();
        script.replace(SOURCE, 24, 26, "").unwrap_err();
        assert_eq!(script.apply(SOURCE), "int f() { return 1; }\nextern /*x*/long x = 2;\n");
    }

    #[test]
    fn test_rejects_bad_offsets() {
        let mut script = EditScript::new();
        assert_eq!(
            script.replace(SOURCE, 5, 4, ""),
            Err(EditError::Inverted { start: 5, end: 4 })
        );
        assert!(matches!(
            script.replace(SOURCE, 0, 100, ""),
            Err(EditError::OutOfBounds { .. })
        ));
        let text = "é";
        assert_eq!(
            script.insert(text, 1, "x"),
            Err(EditError::CharBoundary(1))
        );
        assert!(script.is_empty());
    }

    #[test]
    fn test_original_offset() {
        let mut script = EditScript::new();
        // "int f() { return 1; }" -> "int f();"
        script.replace(SOURCE, 7, 21, ";").unwrap();
        // "int x" -> "extern int x"
        script.insert(SOURCE, 22, "extern ").unwrap();
        let edited = script.apply(SOURCE);

        assert_eq!(script.original_offset(0), 0);
        assert_eq!(script.original_offset(6), 6);
        // inside the ';' replacement
        assert_eq!(script.original_offset(7), 7);
        // the newline after it
        assert_eq!(script.original_offset(8), 21);
        // inside the inserted "extern "
        assert_eq!(script.original_offset(10), 22);
        let x = edited.find("int x").unwrap();
        assert_eq!(script.original_offset(x), SOURCE.find("int x").unwrap());
        assert_eq!(script.original_offset(edited.len()), SOURCE.len());
    }
}
