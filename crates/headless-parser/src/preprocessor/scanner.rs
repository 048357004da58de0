//! Conditional block scanner
//!
//! Finds `#if`/`#ifdef`/`#ifndef`/`#elif*`/`#else`/`#endif` lines on a
//! comment-blanked view of the source and turns them into a [`GuardTimeline`]
//! plus the list of directive spans the C++ front end has to skip.

use headless_core::Span;
use regex::bytes::Regex;
use tracing::{debug, trace};

use super::comments::strip_comments;
use super::guards::{not_accumulated, GuardRule, GuardTimeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectiveKind {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Elifdef,
    Elifndef,
    Else,
    Endif,
}

impl DirectiveKind {
    fn from_keyword(keyword: &[u8]) -> Option<Self> {
        Some(match keyword {
            b"if" => Self::If,
            b"ifdef" => Self::Ifdef,
            b"ifndef" => Self::Ifndef,
            b"elif" => Self::Elif,
            b"elifdef" => Self::Elifdef,
            b"elifndef" => Self::Elifndef,
            b"else" => Self::Else,
            b"endif" => Self::Endif,
            _ => return None,
        })
    }

    fn opens(self) -> bool {
        matches!(self, Self::If | Self::Ifdef | Self::Ifndef)
    }

    fn branches(self) -> bool {
        matches!(self, Self::Elif | Self::Elifdef | Self::Elifndef | Self::Else)
    }

    /// Normalized condition carried by the directive
    fn condition(self, argument: &str) -> Option<String> {
        match self {
            Self::If | Self::Elif => Some(argument.to_string()),
            Self::Ifdef | Self::Elifdef => Some(format!("defined({})", argument)),
            Self::Ifndef | Self::Elifndef => Some(format!("!defined({})", argument)),
            Self::Else | Self::Endif => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Directive {
    kind: DirectiveKind,
    argument: String,
    span: Span,
}

/// Output of [`ConditionalScanner::scan`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Guard events, one per balanced conditional directive
    pub timeline: GuardTimeline,
    /// Full-line spans of every conditional directive, in source order
    pub directives: Vec<Span>,
}

impl ScanResult {
    /// Copy of `source` with every directive span replaced by spaces.
    /// Byte offsets are identical to the original.
    pub fn blanked(&self, source: &str) -> String {
        let mut bytes = source.as_bytes().to_vec();
        for span in &self.directives {
            for b in &mut bytes[span.start..span.end] {
                // keep line structure inside continued directives
                if *b != b'\n' {
                    *b = b' ';
                }
            }
        }
        // Only whole lines are blanked, so char boundaries are preserved
        String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }

    /// Complement of the directive spans within `[0, len)`
    pub fn code_spans(&self, len: usize) -> Vec<Span> {
        let mut spans = Vec::with_capacity(self.directives.len() + 1);
        let mut cursor = 0;
        for span in &self.directives {
            if span.start > cursor {
                spans.push(Span::new(cursor, span.start));
            }
            cursor = cursor.max(span.end);
        }
        if cursor < len {
            spans.push(Span::new(cursor, len));
        }
        spans
    }
}

/// Scanner for conditional-compilation directives
pub struct ConditionalScanner {
    directive: Regex,
    define: Regex,
}

impl ConditionalScanner {
    pub fn new() -> Self {
        Self {
            directive: Regex::new(
                r"^\s*#\s*(ifdef|ifndef|if|elifdef|elifndef|elif|else|endif)\b\s*(.*)$",
            )
            .unwrap(),
            define: Regex::new(r"^\s*#\s*define\s+([A-Za-z_]\w*)\s*$").unwrap(),
        }
    }

    /// Scan `source` and build the guard timeline
    pub fn scan(&self, source: &str) -> ScanResult {
        let stripped = strip_comments(source.as_bytes());
        let directives = self.collect(&stripped);
        let include_guard = self.include_guard(&stripped, &directives);

        let mut timeline = GuardTimeline::new();
        // sibling conditions per nesting level, `None` for the include guard
        let mut levels: Vec<Option<Vec<String>>> = Vec::new();

        for (index, directive) in directives.iter().enumerate() {
            let at = directive.span.start;
            let kind = directive.kind;

            if include_guard == Some(index) {
                timeline.push(at, GuardRule::IncludeGuard(directive.argument.clone()));
                levels.push(None);
                continue;
            }

            if kind.opens() {
                let condition = kind.condition(&directive.argument).unwrap_or_default();
                timeline.push(at, GuardRule::Open(condition.clone()));
                levels.push(Some(vec![condition]));
            } else if kind.branches() {
                match levels.last_mut() {
                    Some(Some(siblings)) => {
                        let condition = kind.condition(&directive.argument);
                        let expr = not_accumulated(siblings, condition.as_deref());
                        timeline.push(at, GuardRule::Branch(expr));
                        siblings.extend(condition);
                    }
                    _ if kind == DirectiveKind::Else => {
                        debug!("Ignoring #else without an open region at offset {}", at);
                    }
                    _ => {
                        // stray #elif: treat as the start of a new region
                        let condition = kind.condition(&directive.argument).unwrap_or_default();
                        timeline.push(at, GuardRule::Open(condition.clone()));
                        levels.push(Some(vec![condition]));
                    }
                }
            } else if levels.pop().is_some() {
                timeline.push(at, GuardRule::End);
            } else {
                debug!("Ignoring unbalanced #endif at offset {}", at);
            }
        }

        trace!(
            "Scanned {} conditional directives, {} guard events",
            directives.len(),
            timeline.len()
        );

        ScanResult {
            timeline,
            directives: directives.into_iter().map(|d| d.span).collect(),
        }
    }

    /// Conditional directives of the comment-blanked text, in source order
    fn collect(&self, stripped: &[u8]) -> Vec<Directive> {
        let mut directives = Vec::new();
        let mut start = 0;

        while start < stripped.len() {
            let (end, joined) = logical_line(stripped, start);
            if let Some(caps) = self.directive.captures(&joined) {
                if let Some(kind) = DirectiveKind::from_keyword(&caps[1]) {
                    let argument = String::from_utf8_lossy(&caps[2]).trim().to_string();
                    directives.push(Directive {
                        kind,
                        argument,
                        span: Span::new(start, end),
                    });
                }
            }
            start = end + 1;
        }

        directives
    }

    /// Index of the directive that guards the whole file, if any
    fn include_guard(&self, stripped: &[u8], directives: &[Directive]) -> Option<usize> {
        let first = directives.first()?;
        if first.kind != DirectiveKind::Ifndef || first.argument.is_empty() {
            return None;
        }

        let mut next = first.span.end + 1;
        let define = loop {
            if next >= stripped.len() {
                return None;
            }
            let (end, joined) = logical_line(stripped, next);
            if !joined.iter().all(u8::is_ascii_whitespace) {
                break joined;
            }
            next = end + 1;
        };
        let caps = self.define.captures(&define)?;
        if caps[1] != *first.argument.as_bytes() {
            return None;
        }

        // the matching #endif must close the file, with no sibling branches
        let mut depth = 0usize;
        for (index, directive) in directives.iter().enumerate() {
            if directive.kind.opens() {
                depth += 1;
            } else if directive.kind.branches() && depth == 1 {
                return None;
            } else if directive.kind == DirectiveKind::Endif {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return (index == directives.len() - 1).then_some(0);
                }
            }
        }
        None
    }
}

impl Default for ConditionalScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan `source` with a fresh scanner
pub fn scan(source: &str) -> ScanResult {
    ConditionalScanner::new().scan(source)
}

/// End offset (exclusive, before the newline) of the logical line starting at
/// `start`, and its text with `\`-continuations joined by single spaces
fn logical_line(bytes: &[u8], start: usize) -> (usize, Vec<u8>) {
    let mut joined = Vec::new();
    let mut from = start;
    loop {
        let end = bytes[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(bytes.len(), |p| from + p);
        let mut segment = trim_end(&bytes[from..end]);
        if from > start {
            while let [b' ' | b'\t', rest @ ..] = segment {
                segment = rest;
            }
        }
        match segment {
            [rest @ .., b'\\'] if end < bytes.len() => {
                joined.extend_from_slice(trim_end(rest));
                joined.push(b' ');
                from = end + 1;
            }
            _ => {
                joined.extend_from_slice(segment);
                return (end, joined);
            }
        }
    }
}

fn trim_end(mut segment: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b' ' | b'\t'] = segment {
        segment = rest;
    }
    segment
}
