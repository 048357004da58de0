//! Declaration-only outline of a whole header
//!
//! Renders records, namespaces, prototypes, variables and fields with every
//! body dropped. Kinds that cannot be rendered yet leave an in-band
//! `<!> TODO:` or `<!> UNKNOWN:` marker instead of failing.

use tree_sitter::{Node, Tree};

use crate::decl::{classify, members, Decl, FunctionDecl, RecordDecl, VariableDecl};
use crate::treesitter::node_text;

/// Render the outline of every top-level declaration, one block per
/// declaration
pub fn outline(tree: &Tree, source: &str) -> String {
    let renderer = Outline { source };
    let mut blocks = Vec::new();
    for node in members(tree.root_node()) {
        let mut out = String::new();
        if renderer.render(node, &mut out, 0) {
            blocks.push(out);
        }
    }
    let mut text = blocks.join("\n");
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

struct Outline<'s> {
    source: &'s str,
}

impl<'s> Outline<'s> {
    /// Render one declaration; `false` when it has no outline
    fn render(&self, node: Node<'_>, out: &mut String, pad: usize) -> bool {
        match classify(node) {
            Decl::Record(record) => return self.record(record, out, pad),
            Decl::Namespace(namespace) => {
                out.push_str("namespace ");
                out.push_str(namespace.name(self.source).unwrap_or_default());
                out.push_str(" {");
                if let Some(body) = namespace.body() {
                    self.children(body, out, pad);
                }
                newline(out, pad);
                out.push('}');
                newline(out, pad);
            }
            Decl::Function(function) if function.template.is_some() => {
                out.push_str("<!> TODO: FunctionTemplate")
            }
            Decl::Function(function) => self.function(function, out, pad),
            Decl::Variable(variable) => self.variable(variable, out, pad),
            Decl::Field(field) => {
                let text = node_text(field.node, self.source).trim();
                out.push_str(text.trim_end_matches(';').trim_end());
                out.push(';');
            }
            Decl::AccessSpecifier(access) => {
                out.push_str(node_text(access, self.source).trim_end_matches(':'));
                out.push(':');
            }
            Decl::LinkageSpec(_) => out.push_str("<!> TODO: LinkageSpec"),
            Decl::Unsupported(kind) => {
                out.push_str("<!> TODO: ");
                out.push_str(kind.name());
            }
            Decl::Unknown(kind) => {
                out.push_str("<!> UNKNOWN: ");
                out.push_str(kind);
            }
            Decl::Ignored => return false,
        }
        true
    }

    fn children(&self, container: Node<'_>, out: &mut String, pad: usize) {
        for child in members(container) {
            let mut rendered = String::new();
            if self.render(child, &mut rendered, pad + 1) {
                newline(out, pad + 1);
                out.push_str(&rendered);
            }
        }
    }

    fn record(&self, record: RecordDecl<'_>, out: &mut String, pad: usize) -> bool {
        let Some(body) = record.body() else {
            return false;
        };
        out.push_str(record.keyword());
        out.push(' ');
        if let Some(name) = record.name() {
            out.push_str(node_text(name, self.source));
        }
        let bases = record.bases(self.source);
        if !bases.is_empty() {
            out.push_str(" : ");
            out.push_str(&bases.join(", "));
        }
        out.push_str(" {");
        self.children(body, out, pad);
        newline(out, pad);
        out.push_str("};");
        newline(out, pad);
        true
    }

    fn function(&self, function: FunctionDecl<'_>, out: &mut String, pad: usize) {
        let source = self.source;
        let modifiers = function.modifiers(source);
        for keyword in ["static", "virtual", "inline"] {
            if modifiers.contains(&keyword) {
                out.push_str(keyword);
                out.push(' ');
            }
        }
        if modifiers.contains(&"const") {
            out.push_str("const ");
        }
        let return_type = function.return_type(source);
        if !return_type.is_empty() {
            out.push_str(&return_type);
            out.push(' ');
        }
        out.push_str(function.name(source));
        out.push_str(" (");

        let params = function.parameters();
        if !params.is_empty() {
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                newline(out, pad + 1);
                out.push_str(&collapse(node_text(*param, source)));
            }
            newline(out, pad);
        }
        out.push(')');

        let pure = function
            .node
            .child_by_field_name("default_value")
            .is_some_and(|value| node_text(value, source) == "0");
        if pure {
            out.push_str(" = 0");
        }
        out.push(';');
    }

    fn variable(&self, variable: VariableDecl<'_>, out: &mut String, pad: usize) {
        let source = self.source;
        let modifiers = variable.modifiers(source);
        let mut prefix = String::new();
        for keyword in ["static", "extern", "constexpr", "const"] {
            if modifiers.contains(&keyword) {
                prefix.push_str(keyword);
                prefix.push(' ');
            }
        }
        if let Some(ty) = variable.type_node() {
            prefix.push_str(node_text(ty, source));
        }

        for (i, declarator) in variable.declarators().iter().enumerate() {
            if i > 0 {
                newline(out, pad);
            }
            out.push_str(&prefix);
            out.push(' ');
            out.push_str(node_text(declarator.node, source));
            if let Some(value) = declarator.value {
                if declarator.has_equals {
                    out.push_str(" = ");
                }
                out.push_str(&collapse(node_text(value, source)));
            }
            out.push(';');
        }
    }
}

fn newline(out: &mut String, pad: usize) {
    out.push('\n');
    for _ in 0..pad {
        out.push('\t');
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
