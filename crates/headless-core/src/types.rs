//! Core type definitions

use serde::{Deserialize, Serialize};

/// Half-open byte range into the original source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// What a hoisted unit was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Function,
    Variable,
}

/// One declaration moved out of the interface.
///
/// Created once per eligible declaration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoistedUnit {
    /// Function or variable
    pub kind: UnitKind,
    /// Fully qualified name used in the definition
    pub qualified_name: String,
    /// Declaration as it reads in the interface
    pub declaration: String,
    /// Out-of-line definition, without the guard wrapper
    pub definition: String,
    /// Normalized guard expression active at the declaration
    pub guard: Option<String>,
    /// Line (1-based) of the declaration in the original source
    pub line: usize,
}

impl HoistedUnit {
    /// Append the definition to `out`, wrapped in its regenerated guard
    pub fn emit(&self, out: &mut String) {
        if let Some(guard) = &self.guard {
            out.push_str("#if ");
            out.push_str(guard);
            out.push('\n');
        }
        out.push_str(&self.definition);
        if self.guard.is_some() {
            out.push_str("#endif\n");
        }
    }
}

/// Result of splitting one translation unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOutput {
    /// Interface text (original source with bodies stripped)
    pub interface: String,
    /// Implementation text; empty when nothing was hoisted
    pub implementation: String,
    /// Number of hoisted declarations
    pub hoisted: usize,
    /// Number of edits applied to the interface
    pub edits: usize,
}

impl SplitOutput {
    /// Output used when no syntax tree could be produced
    pub fn passthrough(source: &str) -> Self {
        Self {
            interface: source.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(guard: Option<&str>) -> HoistedUnit {
        HoistedUnit {
            kind: UnitKind::Function,
            qualified_name: "A::f".into(),
            declaration: "void f();".into(),
            definition: "void A::f() {};\n".into(),
            guard: guard.map(str::to_string),
            line: 3,
        }
    }

    #[test]
    fn test_emit_unguarded() {
        let mut out = String::new();
        unit(None).emit(&mut out);
        assert_eq!(out, "void A::f() {};\n");
    }

    #[test]
    fn test_emit_guarded() {
        let mut out = String::new();
        unit(Some("defined(A)")).emit(&mut out);
        assert_eq!(out, "#if defined(A)\nvoid A::f() {};\n#endif\n");
    }

    #[test]
    fn test_span() {
        let span = Span::new(2, 5);
        assert_eq!(span.len(), 3);
        assert!(span.contains(2));
        assert!(!span.contains(5));
        assert!(Span::new(4, 4).is_empty());
    }
}
