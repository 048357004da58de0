//! `#line` marker reinjection
//!
//! Text copied out of the original header keeps pointing at its origin: a
//! `#line N "path"` marker is inserted wherever the line number the compiler
//! would assign stops matching the line the text came from.

use headless_core::LineIndex;

/// Line number the compiler assigns to the output line being written.
/// `None` until the first marker has been emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCursor(Option<usize>);

impl LineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> Option<usize> {
        self.0
    }

    /// A newline was written
    pub fn newline(&mut self) {
        if let Some(line) = &mut self.0 {
            *line += 1;
        }
    }

    fn advance_over(&mut self, text: &str) {
        for _ in text.matches('\n') {
            self.newline();
        }
    }
}

/// Emits `#line` markers pointing into one original source
#[derive(Debug, Clone)]
pub struct LineMarkers {
    path: String,
    index: LineIndex,
}

impl LineMarkers {
    pub fn new(path: impl Into<String>, source: &str) -> Self {
        Self {
            path: path.into(),
            index: LineIndex::new(source),
        }
    }

    pub fn marker(&self, line: usize) -> String {
        format!("#line {} \"{}\"", line, self.path)
    }

    /// Line (1-based) of an original offset
    pub fn line_of(&self, offset: usize) -> usize {
        self.index.line_of(offset)
    }

    /// Write a marker to `out` unless the cursor already sits on the line of
    /// `origin`. `out` must be at the start of a line.
    pub fn sync(&self, out: &mut String, cursor: &mut LineCursor, origin: usize) -> bool {
        let line = self.line_of(origin);
        if cursor.0 == Some(line) {
            return false;
        }
        out.push_str(&self.marker(line));
        out.push('\n');
        cursor.0 = Some(line);
        true
    }

    /// Append `text` to `out`, keeping `cursor` current
    pub fn push_plain(&self, out: &mut String, cursor: &mut LineCursor, text: &str) {
        out.push_str(text);
        cursor.advance_over(text);
    }

    /// Copy `text` with markers inserted before every non-blank line whose
    /// origin differs from the line the cursor expects.
    ///
    /// `origin` maps an offset of `text` to an offset of the original source.
    /// With `continues_line` the first line of `text` continues an output line
    /// that is already started and never gets a marker.
    pub fn reinject(
        &self,
        text: &str,
        origin: impl Fn(usize) -> usize,
        cursor: &mut LineCursor,
        continues_line: bool,
    ) -> String {
        let mut out = String::with_capacity(text.len());
        let mut offset = 0;
        let mut continued = continues_line;

        for line in text.split_inclusive('\n') {
            let content = line.trim_end_matches(['\n', '\r']);
            let indent = content.len() - content.trim_start().len();
            if !continued && !content.trim().is_empty() {
                self.sync(&mut out, cursor, origin(offset + indent));
            }
            out.push_str(line);
            if line.ends_with('\n') {
                cursor.newline();
            }
            // a marker cannot split a backslash-continued line
            continued = content.ends_with('\\');
            offset += line.len();
        }

        out
    }
}
