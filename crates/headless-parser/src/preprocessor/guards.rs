//! Guard timeline
//!
//! The flat record of conditional-block events produced by the scanner, and
//! the lookup that turns it back into the guard expression enclosing a given
//! source offset.

/// One conditional-compilation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRule {
    /// `#if`, `#ifdef`, `#ifndef`: opens a new region
    Open(String),
    /// `#elif`, `#elifdef`, `#elifndef`, `#else`: replaces the innermost region.
    /// The expression already excludes every earlier sibling branch.
    Branch(String),
    /// `#ifndef X` / `#define X` wrapping the whole file. Opens a region that
    /// never contributes to guards.
    IncludeGuard(String),
    /// `#endif`
    End,
}

impl GuardRule {
    pub fn is_end(&self) -> bool {
        matches!(self, GuardRule::End)
    }

    /// Normalized boolean expression of a start rule
    pub fn expression(&self) -> Option<&str> {
        match self {
            GuardRule::Open(e) | GuardRule::Branch(e) => Some(e),
            GuardRule::IncludeGuard(_) | GuardRule::End => None,
        }
    }
}

/// Conditional-block events ordered by source offset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardTimeline {
    events: Vec<(usize, GuardRule)>,
}

impl GuardTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event. Offsets must be strictly increasing.
    pub fn push(&mut self, offset: usize, rule: GuardRule) {
        debug_assert!(
            self.events.last().map_or(true, |(last, _)| *last < offset),
            "guard events must be recorded in source order"
        );
        self.events.push((offset, rule));
    }

    pub fn events(&self) -> &[(usize, GuardRule)] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Expressions of every region enclosing `offset`, outermost first.
    /// Include guards are transparent and not listed.
    pub fn regions_at(&self, offset: usize) -> Vec<&str> {
        let mut stack: Vec<Option<&str>> = Vec::new();
        for (_, rule) in self.events.iter().take_while(|(at, _)| *at < offset) {
            match rule {
                GuardRule::Open(e) => stack.push(Some(e)),
                GuardRule::IncludeGuard(_) => stack.push(None),
                GuardRule::Branch(e) => {
                    stack.pop();
                    stack.push(Some(e));
                }
                GuardRule::End => {
                    stack.pop();
                }
            }
        }
        stack.into_iter().flatten().collect()
    }

    /// The guard active at `offset`: the conjunction of all enclosing regions
    pub fn active_at(&self, offset: usize) -> Option<String> {
        let regions = self.regions_at(offset);
        match regions.as_slice() {
            [] => None,
            [single] => Some(single.to_string()),
            many => Some(
                many.iter()
                    .map(|e| parenthesize(e))
                    .collect::<Vec<_>>()
                    .join(" && "),
            ),
        }
    }
}

/// Wrap a compound expression in parentheses so it can be conjoined
pub(crate) fn parenthesize(expr: &str) -> String {
    if is_atomic(expr) {
        expr.to_string()
    } else {
        format!("({})", expr)
    }
}

/// `X`, `defined(X)`, `defined X`, `F(...)`, `(...)` and their negations need
/// no parentheses
fn is_atomic(expr: &str) -> bool {
    let expr = expr.trim();
    let inner = expr.strip_prefix('!').map_or(expr, str::trim_start);
    let word = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let rest = inner[word..].trim_start();
    if rest.is_empty() {
        return word > 0;
    }
    if &inner[..word] == "defined" && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return true;
    }
    rest.starts_with('(') && closing_paren(rest) == Some(rest.len() - 1)
}

/// Index of the parenthesis closing the one at index 0
fn closing_paren(expr: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in expr.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Negation of every earlier sibling condition, optionally conjoined with the
/// condition of the branch being opened
pub(crate) fn not_accumulated(siblings: &[String], but: Option<&str>) -> String {
    let mut expr = String::from("!");
    match siblings {
        [single] => expr.push_str(&parenthesize(single)),
        _ => {
            let alternatives: Vec<String> = siblings.iter().map(|s| parenthesize(s)).collect();
            expr.push('(');
            expr.push_str(&alternatives.join(" || "));
            expr.push(')');
        }
    }
    if let Some(but) = but {
        expr.push_str(" && ");
        expr.push_str(&parenthesize(but));
    }
    expr
}
