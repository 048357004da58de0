//! Declaration model
//!
//! A closed view over the tree-sitter nodes the engine cares about. Every
//! named node found in a declaration context maps to exactly one [`Decl`]
//! variant; kinds the engine does not understand fall into
//! [`Decl::Unsupported`] or [`Decl::Unknown`] instead of being dropped.

use headless_core::Span;
use tree_sitter::Node;

use crate::treesitter::{node_span, node_text};

/// Declaration kinds that are recognised but not transformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedKind {
    Typedef,
    TypeAlias,
    ClassTemplate,
    Enum,
    Friend,
}

impl UnsupportedKind {
    pub fn name(&self) -> &'static str {
        match self {
            UnsupportedKind::Typedef => "Typedef",
            UnsupportedKind::TypeAlias => "TypeAlias",
            UnsupportedKind::ClassTemplate => "ClassTemplate",
            UnsupportedKind::Enum => "Enum",
            UnsupportedKind::Friend => "Friend",
        }
    }
}

/// One declaration found in a translation unit, namespace, linkage block or
/// record body
#[derive(Debug, Clone, Copy)]
pub enum Decl<'tree> {
    /// Function or method, defined or only declared
    Function(FunctionDecl<'tree>),
    /// Variable declaration outside of any record
    Variable(VariableDecl<'tree>),
    /// Data member (static or not)
    Field(VariableDecl<'tree>),
    /// `class`, `struct` or `union`
    Record(RecordDecl<'tree>),
    Namespace(NamespaceDecl<'tree>),
    /// `extern "C"` block or declaration
    LinkageSpec(LinkageDecl<'tree>),
    /// `public:`, `protected:`, `private:`
    AccessSpecifier(Node<'tree>),
    Unsupported(UnsupportedKind),
    /// Comments, preprocessor lines, stray punctuation
    Ignored,
    Unknown(&'static str),
}

/// Classify a node appearing directly inside a declaration container
pub fn classify(node: Node<'_>) -> Decl<'_> {
    match node.kind() {
        "function_definition" => match function_declarator(node) {
            Some(declarator) => Decl::Function(FunctionDecl {
                node,
                declarator,
                template: None,
            }),
            None => Decl::Unknown(node.kind()),
        },
        "declaration" => match function_declarator(node) {
            Some(declarator) => Decl::Function(FunctionDecl {
                node,
                declarator,
                template: None,
            }),
            None => Decl::Variable(VariableDecl { node }),
        },
        "field_declaration" => classify_field(node),
        "template_declaration" => classify_template(node),
        "class_specifier" | "struct_specifier" | "union_specifier" => {
            Decl::Record(RecordDecl { node })
        }
        "namespace_definition" => Decl::Namespace(NamespaceDecl { node }),
        "linkage_specification" => Decl::LinkageSpec(LinkageDecl { node }),
        "access_specifier" => Decl::AccessSpecifier(node),
        "type_definition" => Decl::Unsupported(UnsupportedKind::Typedef),
        "alias_declaration" => Decl::Unsupported(UnsupportedKind::TypeAlias),
        "enum_specifier" => Decl::Unsupported(UnsupportedKind::Enum),
        "friend_declaration" => Decl::Unsupported(UnsupportedKind::Friend),
        "comment" | ";" | ":" | "{" | "}" => Decl::Ignored,
        kind if kind.starts_with("preproc_") => Decl::Ignored,
        _ if !node.is_named() => Decl::Ignored,
        kind => Decl::Unknown(kind),
    }
}

fn classify_field(node: Node<'_>) -> Decl<'_> {
    if let Some(declarator) = function_declarator(node) {
        return Decl::Function(FunctionDecl {
            node,
            declarator,
            template: None,
        });
    }
    if node.child_by_field_name("declarator").is_some() {
        return Decl::Field(VariableDecl { node });
    }
    // nested type definition without declarator
    match node.child_by_field_name("type") {
        Some(ty) if is_record_kind(ty.kind()) => Decl::Record(RecordDecl { node: ty }),
        Some(ty) if ty.kind() == "enum_specifier" => Decl::Unsupported(UnsupportedKind::Enum),
        _ => Decl::Unknown(node.kind()),
    }
}

fn classify_template(node: Node<'_>) -> Decl<'_> {
    let mut cursor = node.walk();
    let inner = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "template_parameter_list" && child.kind() != "comment")
        .last();
    let Some(inner) = inner else {
        return Decl::Unknown(node.kind());
    };

    match classify(inner) {
        Decl::Function(mut function) => {
            function.template = Some(node);
            Decl::Function(function)
        }
        Decl::Record(_) => Decl::Unsupported(UnsupportedKind::ClassTemplate),
        Decl::Variable(variable) if is_record_kind(type_kind(variable.node)) => {
            Decl::Unsupported(UnsupportedKind::ClassTemplate)
        }
        Decl::Unsupported(UnsupportedKind::TypeAlias) => {
            Decl::Unsupported(UnsupportedKind::TypeAlias)
        }
        Decl::Unsupported(UnsupportedKind::Friend) => Decl::Unsupported(UnsupportedKind::Friend),
        _ => Decl::Unknown(node.kind()),
    }
}

fn is_record_kind(kind: &str) -> bool {
    matches!(kind, "class_specifier" | "struct_specifier" | "union_specifier")
}

fn type_kind(node: Node<'_>) -> &'static str {
    node.child_by_field_name("type").map_or("", |ty| ty.kind())
}

/// The `function_declarator` of a declaration, unwrapping pointer and
/// reference declarators of the return type. Function pointers are variables
/// and yield `None`. Conversion operators yield the
/// `abstract_function_declarator` inside their `operator_cast`.
fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.child_by_field_name("declarator")?;
    loop {
        match current.kind() {
            "function_declarator" => {
                let inner = current.child_by_field_name("declarator")?;
                return (inner.kind() != "parenthesized_declarator").then_some(current);
            }
            "pointer_declarator" | "attributed_declarator" => {
                current = current.child_by_field_name("declarator")?;
            }
            "reference_declarator" => {
                current = last_named_child(current)?;
            }
            "qualified_operator_cast_identifier" => {
                current = current.child_by_field_name("name")?;
            }
            "operator_cast" => return conversion_declarator(current),
            _ => return None,
        }
    }
}

fn conversion_declarator(operator_cast: Node<'_>) -> Option<Node<'_>> {
    let mut current = operator_cast.child_by_field_name("declarator")?;
    loop {
        match current.kind() {
            "abstract_function_declarator" => return Some(current),
            "abstract_pointer_declarator" => current = current.child_by_field_name("declarator")?,
            "abstract_reference_declarator" => current = last_named_child(current)?,
            _ => return None,
        }
    }
}

fn last_named_child(node: Node<'_>) -> Option<Node<'_>> {
    let count = node.named_child_count();
    (count > 0).then(|| node.named_child(count - 1)).flatten()
}

/// Innermost name of a declarator chain (`identifier`, `field_identifier`,
/// `qualified_identifier`, `operator_name`, `destructor_name`...)
pub fn declarator_name(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    loop {
        let next = match current.kind() {
            "init_declarator"
            | "pointer_declarator"
            | "array_declarator"
            | "function_declarator"
            | "attributed_declarator" => current.child_by_field_name("declarator"),
            "reference_declarator" | "parenthesized_declarator" => last_named_child(current),
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return current,
        }
    }
}

/// Texts of the specifier keywords written before `before` (the first
/// declarator), the type itself excluded
fn modifiers_before<'s>(node: Node<'_>, before: usize, source: &'s str) -> Vec<&'s str> {
    let ty = node.child_by_field_name("type").map(|t| t.id());
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .take_while(|child| child.start_byte() < before)
        .filter(|child| Some(child.id()) != ty && child.kind() != "comment")
        .map(|child| node_text(child, source))
        .collect()
}

/// A function definition or prototype
#[derive(Debug, Clone, Copy)]
pub struct FunctionDecl<'tree> {
    /// `function_definition`, `declaration` or `field_declaration`
    pub node: Node<'tree>,
    /// The `function_declarator` holding name, parameters and qualifiers
    pub declarator: Node<'tree>,
    /// Enclosing `template_declaration`, if any
    pub template: Option<Node<'tree>>,
}

impl<'tree> FunctionDecl<'tree> {
    /// Offset where the whole declaration starts (template prefix included)
    pub fn start(&self) -> usize {
        self.template.unwrap_or(self.node).start_byte()
    }

    fn is_conversion(&self) -> bool {
        self.declarator.kind() == "abstract_function_declarator"
    }

    /// Outermost node of the name: an identifier, a qualified identifier or
    /// the `operator_cast` of a conversion operator
    fn name_node(&self) -> Node<'tree> {
        if !self.is_conversion() {
            return declarator_name(self.declarator);
        }
        let mut node = self.declarator;
        while let Some(parent) = node.parent() {
            if !matches!(parent.kind(), "operator_cast" | "qualified_operator_cast_identifier") {
                break;
            }
            node = parent;
        }
        node
    }

    /// Written name: `f`, `A::f`, `operator==`, `operator bool`...
    pub fn name<'s>(&self, source: &'s str) -> &'s str {
        let node = self.name_node();
        let end = if self.is_conversion() {
            self.declarator
                .child_by_field_name("parameters")
                .map_or(self.declarator.start_byte(), |p| p.start_byte())
        } else {
            node.end_byte()
        };
        source[node.start_byte()..end].trim()
    }

    /// Name written as `A::f`, i.e. an out-of-class definition
    pub fn is_qualified(&self) -> bool {
        matches!(
            self.name_node().kind(),
            "qualified_identifier" | "qualified_operator_cast_identifier"
        )
    }

    pub fn body(&self) -> Option<Node<'tree>> {
        self.node
            .child_by_field_name("body")
            .filter(|body| body.kind() == "compound_statement")
    }

    /// End of the last non-comment token before `body_start`
    pub fn head_end(&self, body_start: usize) -> usize {
        let mut cursor = self.node.walk();
        let end = self
            .node
            .children(&mut cursor)
            .filter(|child| child.end_byte() <= body_start && child.kind() != "comment")
            .map(|child| child.end_byte())
            .max()
            .unwrap_or(self.node.start_byte());
        end
    }

    /// Constructor member-initializer list
    pub fn initializer_list(&self) -> Option<Node<'tree>> {
        let mut cursor = self.node.walk();
        let list = self
            .node
            .children(&mut cursor)
            .find(|child| child.kind() == "field_initializer_list");
        list
    }

    /// Keywords before the declarator: `static`, `inline`, `virtual`, `const`...
    pub fn modifiers<'s>(&self, source: &'s str) -> Vec<&'s str> {
        let before = self
            .node
            .child_by_field_name("declarator")
            .map_or(self.node.end_byte(), |d| d.start_byte());
        modifiers_before(self.node, before, source)
    }

    pub fn has_modifier(&self, source: &str, word: &str) -> bool {
        self.modifiers(source).iter().any(|m| *m == word)
    }

    /// Written return type, `*`/`&` of the declarator chain included.
    /// Empty for constructors, destructors and conversion operators.
    pub fn return_type(&self, source: &str) -> String {
        let mut ty = self
            .node
            .child_by_field_name("type")
            .map(|t| node_text(t, source).to_string())
            .unwrap_or_default();

        let mut current = self.node.child_by_field_name("declarator");
        while let Some(node) = current {
            if node.id() == self.declarator.id() || node.id() == self.name_node().id() {
                break;
            }
            let inner = match node.kind() {
                "reference_declarator" => last_named_child(node),
                _ => node.child_by_field_name("declarator"),
            };
            if let Some(inner) = inner {
                let prefix = source[node.start_byte()..inner.start_byte()].trim();
                ty.push_str(prefix);
            }
            current = inner;
        }
        ty
    }

    /// Parameter nodes in order (comments skipped)
    pub fn parameters(&self) -> Vec<Node<'tree>> {
        let Some(list) = self.declarator.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = list.walk();
        let params = list
            .named_children(&mut cursor)
            .filter(|p| p.kind() != "comment")
            .collect();
        params
    }

    /// Qualifiers after the parameter list that belong in a definition
    /// (`const`, `&&`, `noexcept`, trailing return type...). `override` and
    /// `final` are dropped.
    pub fn trailing_qualifiers<'s>(&self, source: &'s str) -> Vec<&'s str> {
        let Some(params) = self.declarator.child_by_field_name("parameters") else {
            return Vec::new();
        };
        let mut cursor = self.declarator.walk();
        self.declarator
            .children(&mut cursor)
            .filter(|child| child.start_byte() >= params.end_byte())
            .filter(|child| !matches!(child.kind(), "virtual_specifier" | "comment"))
            .map(|child| node_text(child, source))
            .collect()
    }

    /// `template <...>` header text
    pub fn template_prefix(&self) -> Option<Span> {
        let template = self.template?;
        let params = template.child_by_field_name("parameters")?;
        Some(Span::new(template.start_byte(), params.end_byte()))
    }
}

/// Span of a parameter as written in a definition: a defaulted parameter
/// ends with its declarator, before ` = value`
pub fn parameter_span(param: Node<'_>, source: &str) -> Span {
    if param.kind() != "optional_parameter_declaration" {
        return node_span(param);
    }
    if let Some(declarator) = param.child_by_field_name("declarator") {
        return Span::new(param.start_byte(), declarator.end_byte());
    }
    match param.child_by_field_name("default_value") {
        Some(value) => {
            let head = source[param.start_byte()..value.start_byte()]
                .trim_end()
                .trim_end_matches('=')
                .trim_end();
            Span::new(param.start_byte(), param.start_byte() + head.len())
        }
        None => node_span(param),
    }
}

/// One declarator of a variable or field declaration
#[derive(Debug, Clone, Copy)]
pub struct Declarator<'tree> {
    /// The declarator without its initializer (`x`, `*p`, `arr[3]`)
    pub node: Node<'tree>,
    /// Initializer expression, brace list or argument list
    pub value: Option<Node<'tree>>,
    /// Whether the initializer is introduced by `=`
    pub has_equals: bool,
}

impl<'tree> Declarator<'tree> {
    pub fn name(&self) -> Node<'tree> {
        declarator_name(self.node)
    }
}

/// Variable or data member declaration
#[derive(Debug, Clone, Copy)]
pub struct VariableDecl<'tree> {
    pub node: Node<'tree>,
}

impl<'tree> VariableDecl<'tree> {
    pub fn type_node(&self) -> Option<Node<'tree>> {
        self.node.child_by_field_name("type")
    }

    /// Declarators in order, each with its initializer
    pub fn declarators(&self) -> Vec<Declarator<'tree>> {
        let mut declarators: Vec<Declarator<'tree>> = Vec::new();
        let mut equals_pending = false;

        for i in 0..self.node.child_count() {
            let Some(child) = self.node.child(i) else {
                continue;
            };
            match self.node.field_name_for_child(i as u32) {
                Some("declarator") => {
                    equals_pending = false;
                    declarators.push(match child.kind() {
                        "init_declarator" => init_declarator(child),
                        _ => Declarator {
                            node: child,
                            value: None,
                            has_equals: false,
                        },
                    });
                }
                Some("default_value") => {
                    if let Some(last) = declarators.last_mut() {
                        last.value = Some(child);
                        last.has_equals = equals_pending;
                    }
                }
                _ if child.kind() == "=" => equals_pending = true,
                _ => {}
            }
        }

        declarators
    }

    /// Keywords before the first declarator, the type excluded
    pub fn modifiers<'s>(&self, source: &'s str) -> Vec<&'s str> {
        let before = self
            .node
            .child_by_field_name("declarator")
            .map_or(self.node.end_byte(), |d| d.start_byte());
        modifiers_before(self.node, before, source)
    }

    pub fn has_modifier(&self, source: &str, word: &str) -> bool {
        self.modifiers(source).iter().any(|m| *m == word)
    }
}

fn init_declarator(node: Node<'_>) -> Declarator<'_> {
    let mut cursor = node.walk();
    let has_equals = node.children(&mut cursor).any(|c| c.kind() == "=");
    Declarator {
        node: node.child_by_field_name("declarator").unwrap_or(node),
        value: node.child_by_field_name("value"),
        has_equals,
    }
}

/// `class`, `struct` or `union` specifier
#[derive(Debug, Clone, Copy)]
pub struct RecordDecl<'tree> {
    pub node: Node<'tree>,
}

impl<'tree> RecordDecl<'tree> {
    /// `class`, `struct` or `union`
    pub fn keyword(&self) -> &'static str {
        match self.node.kind() {
            "class_specifier" => "class",
            "union_specifier" => "union",
            _ => "struct",
        }
    }

    pub fn name(&self) -> Option<Node<'tree>> {
        self.node.child_by_field_name("name")
    }

    pub fn body(&self) -> Option<Node<'tree>> {
        self.node.child_by_field_name("body")
    }

    /// Base classes as written (`public Base`, `virtual private B<T>`)
    pub fn bases<'s>(&self, source: &'s str) -> Vec<&'s str> {
        let mut cursor = self.node.walk();
        let clause = self
            .node
            .children(&mut cursor)
            .find(|child| child.kind() == "base_class_clause");
        let Some(clause) = clause else {
            return Vec::new();
        };
        let text = node_text(clause, source).trim_start_matches(':');
        split_top_level(text, ',')
            .into_iter()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .collect()
    }
}

/// Split on `separator` outside of brackets
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Namespace definition, possibly anonymous or nested (`a::b`)
#[derive(Debug, Clone, Copy)]
pub struct NamespaceDecl<'tree> {
    pub node: Node<'tree>,
}

impl<'tree> NamespaceDecl<'tree> {
    pub fn name<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.node
            .child_by_field_name("name")
            .map(|n| node_text(n, source))
    }

    pub fn body(&self) -> Option<Node<'tree>> {
        self.node.child_by_field_name("body")
    }
}

/// `extern "C"` block
#[derive(Debug, Clone, Copy)]
pub struct LinkageDecl<'tree> {
    pub node: Node<'tree>,
}

impl<'tree> LinkageDecl<'tree> {
    /// Declarations governed by the linkage specification
    pub fn members(&self) -> Vec<Node<'tree>> {
        let Some(body) = self.node.child_by_field_name("body") else {
            return Vec::new();
        };
        if body.kind() != "declaration_list" {
            return vec![body];
        }
        let mut cursor = body.walk();
        let members = body.named_children(&mut cursor).collect();
        members
    }
}

/// Named children of a declaration container
pub fn members(container: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = container.walk();
    let members = container.named_children(&mut cursor).collect();
    members
}
