//! Syntax tree hoister
//!
//! Walks the declarations of a parsed header in source order and moves
//! function bodies and variable initializers out of it. Every move produces
//! edits against the original text (what the interface loses) and a
//! [`HoistedUnit`] (what the implementation gains).

use headless_core::{HoistedUnit, LineIndex, Span, UnitKind};
use regex::Regex;
use tracing::{debug, trace, warn};
use tree_sitter::{Node, Tree};

use crate::decl::{self, classify, parameter_span, Decl, FunctionDecl, VariableDecl};
use crate::deduce::deduce_literal;
use crate::lines::{LineCursor, LineMarkers};
use crate::preprocessor::GuardTimeline;
use crate::rewrite::EditScript;
use crate::treesitter::{node_span, node_text};

/// Specifiers that keep a function body in the header
const INLINE_SPECIFIERS: &[&str] = &["inline", "constexpr", "consteval", "__inline", "__forceinline"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Namespace,
    Record,
}

/// What a hoisting pass produced
#[derive(Debug, Default)]
pub struct Hoisted {
    /// Edits turning the original source into the interface
    pub edits: EditScript,
    /// Definitions for the implementation, in source order
    pub units: Vec<HoistedUnit>,
}

/// Hoists definitions out of one parsed translation unit
pub struct Hoister<'a> {
    source: &'a str,
    timeline: &'a GuardTimeline,
    markers: Option<&'a LineMarkers>,
    index: LineIndex,
    storage: Regex,
    scope: Vec<String>,
    hoisted: Hoisted,
}

impl<'a> Hoister<'a> {
    pub fn new(
        source: &'a str,
        timeline: &'a GuardTimeline,
        markers: Option<&'a LineMarkers>,
    ) -> Self {
        Self {
            source,
            timeline,
            markers,
            index: LineIndex::new(source),
            storage: Regex::new(r"\b(static|extern)\b\s*").unwrap(),
            scope: Vec::new(),
            hoisted: Hoisted::default(),
        }
    }

    /// Hoist everything eligible in `tree`
    pub fn hoist(mut self, tree: &Tree) -> Hoisted {
        self.walk(tree.root_node(), Scope::Namespace);
        debug!(
            "Hoisted {} units with {} edits",
            self.hoisted.units.len(),
            self.hoisted.edits.len()
        );
        self.hoisted
    }

    fn walk(&mut self, container: Node<'_>, scope: Scope) {
        for member in decl::members(container) {
            self.visit(member, scope);
        }
    }

    fn visit(&mut self, node: Node<'_>, scope: Scope) {
        match classify(node) {
            Decl::Function(function) => self.hoist_function(function, scope),
            Decl::Variable(variable) if scope == Scope::Namespace => {
                self.hoist_variable(variable, scope)
            }
            Decl::Field(field) if scope == Scope::Record => {
                if field.has_modifier(self.source, "static") {
                    self.hoist_variable(field, scope);
                }
            }
            Decl::Record(record) => {
                let (Some(name), Some(body)) = (record.name(), record.body()) else {
                    return;
                };
                self.scope.push(node_text(name, self.source).to_string());
                self.walk(body, Scope::Record);
                self.scope.pop();
            }
            Decl::Namespace(namespace) => match (namespace.name(self.source), namespace.body()) {
                (Some(name), Some(body)) => {
                    self.scope.push(name.to_string());
                    self.walk(body, Scope::Namespace);
                    self.scope.pop();
                }
                _ => debug!("Skipping anonymous namespace at offset {}", node.start_byte()),
            },
            Decl::LinkageSpec(linkage) => {
                for member in linkage.members() {
                    self.visit(member, scope);
                }
            }
            Decl::Unsupported(kind) => {
                debug!("Skipping {} at offset {}", kind.name(), node.start_byte())
            }
            Decl::Unknown(kind) => trace!("Ignoring {} at offset {}", kind, node.start_byte()),
            _ => {}
        }
    }

    fn qualify(&self, name: &str) -> String {
        let mut qualified = String::new();
        for part in &self.scope {
            qualified.push_str(part);
            qualified.push_str("::");
        }
        qualified.push_str(name);
        qualified
    }

    fn edit(&mut self, start: usize, end: usize, text: impl Into<String>) -> bool {
        match self.hoisted.edits.replace(self.source, start, end, text) {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping edit: {}", e);
                false
            }
        }
    }

    fn hoist_function(&mut self, function: FunctionDecl<'_>, scope: Scope) {
        let source = self.source;
        let Some(body) = function.body() else {
            return;
        };
        let modifiers = function.modifiers(source);
        if modifiers.iter().any(|m| INLINE_SPECIFIERS.contains(m)) {
            trace!("Keeping inline function at offset {}", function.start());
            return;
        }

        let start = function.start();
        let qualified_name = self.qualify(function.name(source));
        let body_start = function
            .initializer_list()
            .map_or(body.start_byte(), |list| list.start_byte());
        let body_end = body.end_byte();

        let declaration = if function.is_qualified() {
            // a qualified redeclaration would be ill-formed
            if !self.edit(start, body_end, "") {
                return;
            }
            String::new()
        } else {
            // comments between declarator and body stay after the `;`
            let cut = function.head_end(body_start);
            let gap_end = cut.max(source[..body_start].trim_end().len());
            let end = if source[body_end..].starts_with(';') { body_end + 1 } else { body_end };
            if !self.edit(cut, end, format!(";{}", &source[cut..gap_end])) {
                return;
            }
            format!("{};", source[start..cut].trim())
        };

        let mut writer = DefinitionWriter::new(self.markers, source);
        writer.start_line(start);
        if let Some(prefix) = function.template_prefix() {
            writer.copy(prefix, false);
            writer.push("\n");
            writer.start_line(function.node.start_byte());
        }

        let mut head = String::new();
        if scope == Scope::Namespace && modifiers.contains(&"static") {
            head.push_str("static ");
        }
        if modifiers.contains(&"const") {
            head.push_str("const ");
        }
        let return_type = function.return_type(source);
        if !return_type.is_empty() {
            head.push_str(&return_type);
            head.push(' ');
        }
        head.push_str(&qualified_name);
        head.push('(');
        writer.push(&head);

        let mut marked = false;
        for (i, param) in function.parameters().into_iter().enumerate() {
            if i > 0 {
                writer.push(", ");
            }
            let span = parameter_span(param, source);
            if writer.needs_marker(span.start) {
                writer.push("\n");
                writer.start_line(span.start);
                writer.push("\t");
                marked = true;
            }
            writer.copy(span, true);
        }
        if marked {
            writer.push("\n");
        }
        writer.push(") ");
        for qualifier in function.trailing_qualifiers(source) {
            writer.push(qualifier);
            writer.push(" ");
        }
        writer.copy(Span::new(body_start, body_end), true);
        writer.push(";\n");

        let line = self.index.line_of(start);
        debug!("Hoisting function {} (line {})", qualified_name, line);
        self.hoisted.units.push(HoistedUnit {
            kind: UnitKind::Function,
            qualified_name,
            declaration,
            definition: writer.finish(),
            guard: self.timeline.active_at(start),
            line,
        });
    }

    fn hoist_variable(&mut self, variable: VariableDecl<'_>, scope: Scope) {
        let source = self.source;
        let modifiers = variable.modifiers(source);
        let has = |word: &str| modifiers.contains(&word);
        if has("constexpr") || has("inline") || (scope == Scope::Namespace && has("static")) {
            return;
        }
        let Some(ty) = variable.type_node() else {
            return;
        };
        let declarators = variable.declarators();
        if declarators.is_empty() {
            return;
        }

        let start = variable.node.start_byte();
        let guard = self.timeline.active_at(start);
        let line = self.index.line_of(start);

        // `int A::x;` defines a member declared elsewhere
        let qualified: Vec<Node<'_>> = declarators
            .iter()
            .map(|d| d.name())
            .filter(|name| name.kind() == "qualified_identifier")
            .collect();
        if !qualified.is_empty() {
            self.move_definition(variable.node, &qualified, guard, line);
            return;
        }

        // initializers from the tree, or found by scanning after the declarator
        let initializers: Vec<Option<Initializer>> = declarators
            .iter()
            .enumerate()
            .map(|(i, declarator)| {
                let limit = declarators
                    .get(i + 1)
                    .map_or(variable.node.end_byte(), |next| next.node.start_byte());
                match declarator.value {
                    Some(value) => Some(Initializer {
                        cut: declarator.node.end_byte(),
                        value: node_span(value),
                        node: Some(value),
                        equals: declarator.has_equals,
                    }),
                    None => scan_initializer(source, declarator.node.end_byte(), limit),
                }
            })
            .collect();
        if initializers.iter().all(Option::is_none) {
            return;
        }

        let deduced = if ty.kind() == "placeholder_type_specifier" {
            let value = initializers.iter().flatten().find_map(|init| init.node);
            match value.and_then(|value| deduce_literal(value, source)) {
                Some(deduced) => Some(deduced),
                None => {
                    debug!("Cannot deduce placeholder type at offset {}", start);
                    return;
                }
            }
        } else {
            None
        };

        let first_start = declarators[0].node.start_byte();
        let raw_type = format!(
            "{}{}{}",
            &source[start..ty.start_byte()],
            deduced.as_deref().unwrap_or_else(|| node_text(ty, source)),
            &source[ty.end_byte()..first_start]
        );
        let type_text = self
            .storage
            .replace_all(&raw_type, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        // `char* p` stays glued, `int x` keeps its space
        let separator = if raw_type.ends_with(char::is_whitespace) { " " } else { "" };

        let needs_extern = scope == Scope::Namespace && !has("extern");
        if needs_extern && !self.edit(start, start, "extern ") {
            return;
        }
        if let Some(deduced) = &deduced {
            self.edit(ty.start_byte(), ty.end_byte(), deduced.clone());
        }
        for initializer in initializers.iter().flatten() {
            self.edit(initializer.cut, initializer.value.end, "");
        }

        for (declarator, initializer) in declarators.iter().zip(&initializers) {
            if initializer.is_none() && !needs_extern {
                continue;
            }
            let name = declarator.name();
            let qualified_name = self.qualify(node_text(name, source));
            let qualified_declarator = format!(
                "{}{}{}",
                &source[declarator.node.start_byte()..name.start_byte()],
                qualified_name,
                &source[name.end_byte()..declarator.node.end_byte()]
            );

            let mut writer = DefinitionWriter::new(self.markers, source);
            writer.start_line(start);
            writer.push(&type_text);
            writer.push(separator);
            writer.push(&qualified_declarator);
            if let Some(initializer) = initializer {
                if initializer.equals {
                    writer.push(" = ");
                }
                writer.copy(initializer.value, true);
            }
            writer.push(";\n");

            debug!("Hoisting variable {} (line {})", qualified_name, line);
            self.hoisted.units.push(HoistedUnit {
                kind: UnitKind::Variable,
                qualified_name,
                declaration: format!(
                    "{}{}{}{};",
                    if needs_extern { "extern " } else { "" },
                    type_text,
                    separator,
                    node_text(declarator.node, source)
                ),
                definition: writer.finish(),
                guard: guard.clone(),
                line,
            });
        }
    }

    /// Move a whole declaration to the implementation, prefixing the given
    /// names with the enclosing namespaces
    fn move_definition(
        &mut self,
        node: Node<'_>,
        names: &[Node<'_>],
        guard: Option<String>,
        line: usize,
    ) {
        let span = node_span(node);
        if !self.edit(span.start, span.end, "") {
            return;
        }
        let mut writer = DefinitionWriter::new(self.markers, self.source);
        writer.start_line(span.start);
        let mut copied = span.start;
        for name in names {
            writer.copy(Span::new(copied, name.start_byte()), copied != span.start);
            writer.push(&self.qualify(node_text(*name, self.source)));
            copied = name.end_byte();
        }
        writer.copy(Span::new(copied, span.end), true);
        writer.push("\n");

        let qualified_name = self.qualify(node_text(names[0], self.source));
        debug!("Moving definition {} (line {})", qualified_name, line);
        self.hoisted.units.push(HoistedUnit {
            kind: UnitKind::Variable,
            qualified_name,
            declaration: String::new(),
            definition: writer.finish(),
            guard,
            line,
        });
    }
}

/// Initializer of one declarator
#[derive(Debug, Clone, Copy)]
struct Initializer<'tree> {
    /// Interface text is cut from here (end of the declarator)...
    cut: usize,
    /// ...through the end of the value
    value: Span,
    node: Option<Node<'tree>>,
    equals: bool,
}

/// Find `= value` between `from` and `limit`, the value ending at the first
/// top-level `,` or `;`
fn scan_initializer<'tree>(source: &str, from: usize, limit: usize) -> Option<Initializer<'tree>> {
    let bytes = source.as_bytes();
    let limit = limit.min(bytes.len());
    let mut i = from;
    while i < limit && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= limit || bytes[i] != b'=' || bytes.get(i + 1) == Some(&b'=') {
        return None;
    }
    i += 1;
    while i < limit && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let value_start = i;

    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    while i < limit {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                b',' | b';' if depth <= 0 => break,
                _ => {}
            },
        }
        i += 1;
    }

    let value_end = value_start + source[value_start..i.min(limit)].trim_end().len();
    (value_end > value_start).then_some(Initializer {
        cut: from,
        value: Span::new(value_start, value_end),
        node: None,
        equals: true,
    })
}

/// Assembles one definition, with `#line` markers when enabled
struct DefinitionWriter<'a> {
    markers: Option<&'a LineMarkers>,
    source: &'a str,
    out: String,
    cursor: LineCursor,
}

impl<'a> DefinitionWriter<'a> {
    fn new(markers: Option<&'a LineMarkers>, source: &'a str) -> Self {
        Self {
            markers,
            source,
            out: String::new(),
            cursor: LineCursor::new(),
        }
    }

    /// At a line start: point the following text at the line of `origin`
    fn start_line(&mut self, origin: usize) {
        if let Some(markers) = self.markers {
            markers.sync(&mut self.out, &mut self.cursor, origin);
        }
    }

    fn needs_marker(&self, origin: usize) -> bool {
        self.markers
            .is_some_and(|markers| self.cursor.line() != Some(markers.line_of(origin)))
    }

    fn push(&mut self, text: &str) {
        match self.markers {
            Some(markers) => markers.push_plain(&mut self.out, &mut self.cursor, text),
            None => self.out.push_str(text),
        }
    }

    /// Copy original text
    fn copy(&mut self, span: Span, continues_line: bool) {
        let text = &self.source[span.start..span.end];
        match self.markers {
            Some(markers) => {
                let copied =
                    markers.reinject(text, |offset| span.start + offset, &mut self.cursor, continues_line);
                self.out.push_str(&copied);
            }
            None => self.out.push_str(text),
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessor::scan;
    use crate::treesitter::CppFrontEnd;
    use pretty_assertions::assert_eq;

    fn hoist(source: &str) -> (String, Vec<HoistedUnit>) {
        let scanned = scan(source);
        let tree = CppFrontEnd::new().parse(source, &scanned).unwrap();
        let hoisted = Hoister::new(source, &scanned.timeline, None).hoist(&tree);
        (hoisted.edits.apply(source), hoisted.units)
    }

    fn definitions(units: &[HoistedUnit]) -> Vec<&str> {
        units.iter().map(|u| u.definition.as_str()).collect()
    }

    #[test]
    fn test_method_with_defaults() {
        let source = "class A {\n  int f(int a = 1, bool b = true) { return a; }\n};\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "class A {\n  int f(int a = 1, bool b = true);\n};\n");
        assert_eq!(definitions(&units), vec!["int A::f(int a, bool b) { return a; };\n"]);
        assert_eq!(units[0].declaration, "int f(int a = 1, bool b = true);");
        assert_eq!(units[0].line, 2);
        assert_eq!(units[0].guard, None);
    }

    #[test]
    fn test_existing_semicolon_kept_single() {
        let source = "struct S { void g() {}; };";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "struct S { void g(); };");
        assert_eq!(definitions(&units), vec!["void S::g() {};\n"]);
    }

    #[test]
    fn test_inline_and_constexpr_stay() {
        let source = "inline int a() { return 1; }\nconstexpr int b() { return 2; }\nstruct S { int c(); };\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, source);
        assert!(units.is_empty());
    }

    #[test]
    fn test_free_function_in_namespace() {
        let source = "namespace n {\nnamespace m {\nstatic const char* name() { return \"x\"; }\n}\n}\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "namespace n {\nnamespace m {\nstatic const char* name();\n}\n}\n");
        assert_eq!(
            definitions(&units),
            vec!["static const char* n::m::name() { return \"x\"; };\n"]
        );
    }

    #[test]
    fn test_member_drops_static_virtual_override() {
        let source = "struct B {\n  static int s() { return 0; }\n  virtual void v() const override {}\n};";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "struct B {\n  static int s();\n  virtual void v() const override;\n};");
        assert_eq!(
            definitions(&units),
            vec!["int B::s() { return 0; };\n", "void B::v() const {};\n"]
        );
    }

    #[test]
    fn test_constructor_keeps_initializer_list() {
        let source = "struct P {\n  P(int x) : x_(x) { }\n  ~P() {}\n  int x_;\n};";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "struct P {\n  P(int x);\n  ~P();\n  int x_;\n};");
        assert_eq!(
            definitions(&units),
            vec!["P::P(int x) : x_(x) { };\n", "P::~P() {};\n"]
        );
    }

    #[test]
    fn test_qualified_definition_is_moved() {
        let source = "struct A { void f(); };\nvoid A::f() { }\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "struct A { void f(); };\n\n");
        assert_eq!(definitions(&units), vec!["void A::f() { };\n"]);
        assert_eq!(units[0].qualified_name, "A::f");
    }

    #[test]
    fn test_qualified_member_definitions_in_namespace() {
        let source = "namespace n {\nstruct A { void f(); static int x; };\nvoid A::f() { }\nint A::x = 1;\n}\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "namespace n {\nstruct A { void f(); static int x; };\n\n\n}\n");
        assert_eq!(
            definitions(&units),
            vec!["void n::A::f() { };\n", "int n::A::x = 1;\n"]
        );
        assert_eq!(units[1].qualified_name, "n::A::x");
    }

    #[test]
    fn test_conversion_operator_is_hoisted() {
        let source = "struct B {\n  operator bool() const { return true; }\n  bool operator==(const B&) const { return true; }\n};";
        let (interface, units) = hoist(source);
        assert_eq!(
            interface,
            "struct B {\n  operator bool() const;\n  bool operator==(const B&) const;\n};"
        );
        assert_eq!(
            definitions(&units),
            vec![
                "B::operator bool() const { return true; };\n",
                "bool B::operator==(const B&) const { return true; };\n"
            ]
        );
    }

    #[test]
    fn test_comment_before_body_keeps_terminator() {
        let source = "struct S {\n  void f() // does f\n  {\n  }\n  int g();\n};";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "struct S {\n  void f(); // does f\n  int g();\n};");
        assert_eq!(units[0].declaration, "void f();");
        assert_eq!(definitions(&units), vec!["void S::f() {\n  };\n"]);
    }

    #[test]
    fn test_auto_out_of_int_range_untouched() {
        let source = "auto big = 3000000000;\nauto small = 7;\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "auto big = 3000000000;\nextern int small;\n");
        assert_eq!(definitions(&units), vec!["int small = 7;\n"]);
    }

    #[test]
    fn test_skips_templates_friends_and_anonymous_namespaces() {
        let source = "template <typename T> struct C { void f() {} };\nnamespace { void g() {} }\nstruct F { friend void h() {} };\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, source);
        assert!(units.is_empty());
    }

    #[test]
    fn test_function_template_prefix() {
        let source = "template <typename T>\nT id(T t) { return t; }\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "template <typename T>\nT id(T t);\n");
        assert_eq!(definitions(&units), vec!["template <typename T>\nT id(T t) { return t; };\n"]);
    }

    #[test]
    fn test_guards_recorded_per_unit() {
        let source = "#ifdef A\nvoid a() {}\n#elif defined(B)\nvoid b() {}\n#else\nvoid c() {}\n#endif\nvoid d() {}\n";
        let (interface, units) = hoist(source);
        let guards: Vec<Option<&str>> = units.iter().map(|u| u.guard.as_deref()).collect();
        assert_eq!(
            guards,
            vec![
                Some("defined(A)"),
                Some("!defined(A) && defined(B)"),
                Some("!(defined(A) || defined(B))"),
                None
            ]
        );
        assert_eq!(
            interface,
            "#ifdef A\nvoid a();\n#elif defined(B)\nvoid b();\n#else\nvoid c();\n#endif\nvoid d();\n"
        );
    }

    #[test]
    fn test_namespace_variables() {
        let source = "namespace cfg {\nint a, b = 2;\nconst char* name = \"x\";\nstatic int hidden = 1;\nconstexpr int k = 3;\nextern int declared;\n}\n";
        let (interface, units) = hoist(source);
        assert_eq!(
            interface,
            "namespace cfg {\nextern int a, b;\nextern const char* name;\nstatic int hidden = 1;\nconstexpr int k = 3;\nextern int declared;\n}\n"
        );
        assert_eq!(
            definitions(&units),
            vec![
                "int cfg::a;\n",
                "int cfg::b = 2;\n",
                "const char* cfg::name = \"x\";\n"
            ]
        );
    }

    #[test]
    fn test_brace_and_array_initializers() {
        let source = "int arr[] = {1, 2};\nint v{3};\n";
        let (interface, units) = hoist(source);
        assert_eq!(interface, "extern int arr[];\nextern int v;\n");
        assert_eq!(definitions(&units), vec!["int arr[] = {1, 2};\n", "int v{3};\n"]);
    }

    #[test]
    fn test_auto_variables() {
        let source = "auto count = 10ul;\nauto label = \"x\";\nauto unknown = make();\n";
        let (interface, units) = hoist(source);
        assert_eq!(
            interface,
            "extern unsigned long count;\nextern const char * label;\nauto unknown = make();\n"
        );
        assert_eq!(
            definitions(&units),
            vec!["unsigned long count = 10ul;\n", "const char * label = \"x\";\n"]
        );
    }

    #[test]
    fn test_static_data_member() {
        let source = "struct S {\n  static int count = 0;\n  int plain = 1;\n  static const int limit;\n};";
        let (interface, units) = hoist(source);
        assert_eq!(
            interface,
            "struct S {\n  static int count;\n  int plain = 1;\n  static const int limit;\n};"
        );
        assert_eq!(definitions(&units), vec!["int S::count = 0;\n"]);
        assert_eq!(units[0].kind, UnitKind::Variable);
    }

    #[test]
    fn test_scan_initializer_fallback() {
        let source = "int x = f(1, 2), y;";
        let init = scan_initializer(source, 5, source.len()).unwrap();
        assert_eq!(&source[init.value.start..init.value.end], "f(1, 2)");
        assert!(scan_initializer("a == b", 1, 6).is_none());
        let quoted = "s = \"a;b\";";
        let init = scan_initializer(quoted, 1, quoted.len()).unwrap();
        assert_eq!(&quoted[init.value.start..init.value.end], "\"a;b\"");
    }

    #[test]
    fn test_line_markers_in_definitions() {
        let source = "struct A {\n  void f(\n    int a,\n    int b = 2) {\n    go();\n  }\n};\n";
        let scanned = scan(source);
        let tree = CppFrontEnd::new().parse(source, &scanned).unwrap();
        let markers = LineMarkers::new("a.hpp", source);
        let hoisted = Hoister::new(source, &scanned.timeline, Some(&markers)).hoist(&tree);
        assert_eq!(
            hoisted.units[0].definition,
            "#line 2 \"a.hpp\"\nvoid A::f(\n\tint a, \n\tint b\n) {\n#line 5 \"a.hpp\"\n    go();\n  };\n"
        );
    }
}
