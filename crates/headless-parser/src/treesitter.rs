//! Tree-sitter based C++ front end
//!
//! Parses the original source buffer while skipping conditional directive
//! lines, so that every node offset is an offset into the text the edits are
//! applied to.

use headless_core::{LineIndex, Span};
use tree_sitter::{Node, Parser as TSParser, Point, Range, Tree};
use tracing::{debug, warn};

use crate::preprocessor::ScanResult;

/// Tree-sitter parser for C++
pub struct CppFrontEnd {
    parser: TSParser,
}

impl CppFrontEnd {
    /// Create a new Tree-sitter parser for C++
    pub fn new() -> Self {
        let mut parser = TSParser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .expect("Failed to load C++ grammar");
        Self { parser }
    }

    /// Parse `source`, skipping the directive lines recorded in `scan`.
    ///
    /// Syntax errors are not fatal; `None` only when tree-sitter gives up.
    pub fn parse(&mut self, source: &str, scan: &ScanResult) -> Option<Tree> {
        if scan.directives.is_empty() {
            return self.parse_plain(source);
        }

        let index = LineIndex::new(source);
        let ranges: Vec<Range> = scan
            .code_spans(source.len())
            .into_iter()
            .map(|span| to_range(&index, span))
            .collect();

        let tree = if ranges.is_empty() {
            None
        } else {
            match self.parser.set_included_ranges(&ranges) {
                Ok(()) => {
                    let tree = self.parser.parse(source, None);
                    self.reset_ranges();
                    tree
                }
                Err(e) => {
                    debug!("Included ranges rejected ({:?}), parsing blanked copy", e);
                    None
                }
            }
        };

        let tree = match tree {
            Some(tree) => Some(tree),
            None => self.parser.parse(scan.blanked(source), None),
        };
        if tree.is_none() {
            warn!("tree-sitter produced no syntax tree");
        }
        tree.inspect(log_diagnostics)
    }

    /// Parse `source` as is, directives included
    pub fn parse_plain(&mut self, source: &str) -> Option<Tree> {
        let tree = self.parser.parse(source, None);
        if tree.is_none() {
            warn!("tree-sitter produced no syntax tree");
        }
        tree.inspect(log_diagnostics)
    }

    fn reset_ranges(&mut self) {
        if let Err(e) = self.parser.set_included_ranges(&[]) {
            warn!("Failed to reset included ranges: {:?}", e);
        }
    }
}

impl Default for CppFrontEnd {
    fn default() -> Self {
        Self::new()
    }
}

fn to_range(index: &LineIndex, span: Span) -> Range {
    let point = |offset| {
        let (row, column) = index.point_of(offset);
        Point { row, column }
    };
    Range {
        start_byte: span.start,
        end_byte: span.end,
        start_point: point(span.start),
        end_point: point(span.end),
    }
}

fn log_diagnostics(tree: &Tree) {
    let root = tree.root_node();
    if root.has_error() {
        debug!(
            "Syntax tree contains errors (root spans {}..{}); continuing best-effort",
            root.start_byte(),
            root.end_byte()
        );
    }
}

/// Source text of `node`
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Byte span of `node`
pub fn node_span(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}
