//! Placeholder type deduction
//!
//! `auto` variables can only be split when their type can be spelled out in
//! the interface. Only literal initializers are understood.

use tree_sitter::Node;

use crate::treesitter::node_text;

/// Spelled-out type of a literal initializer, if it is one
pub fn deduce_literal(value: Node<'_>, source: &str) -> Option<String> {
    match value.kind() {
        "number_literal" => number_type(node_text(value, source)).map(str::to_string),
        "char_literal" => char_type(node_text(value, source)).map(str::to_string),
        "string_literal" | "raw_string_literal" => {
            string_type(node_text(value, source)).map(|ch| format!("const {} *", ch))
        }
        "concatenated_string" => {
            let first = value.named_child(0)?;
            deduce_literal(first, source)
        }
        "true" | "false" => Some("bool".into()),
        "nullptr" | "null" if node_text(value, source) == "nullptr" => {
            Some("std::nullptr_t".into())
        }
        "parenthesized_expression" => deduce_literal(value.named_child(0)?, source),
        "unary_expression" => {
            let operator = value.child_by_field_name("operator")?;
            let argument = value.child_by_field_name("argument")?;
            let sign = matches!(node_text(operator, source), "-" | "+");
            (sign && argument.kind() == "number_literal")
                .then(|| deduce_literal(argument, source))
                .flatten()
        }
        _ => None,
    }
}

/// Type of a numeric literal from its suffix and magnitude. Integer values
/// whose type depends on the width of `long` are not deduced.
pub fn number_type(literal: &str) -> Option<&'static str> {
    let literal = literal.replace('\'', "");
    let lower = literal.to_ascii_lowercase();
    let hex = lower.starts_with("0x");
    let is_float = if hex {
        lower.contains('p')
    } else {
        lower.contains('.') || lower.contains('e')
    };

    if is_float {
        return match lower.chars().last()? {
            'f' => Some("float"),
            'l' => Some("long double"),
            c if c.is_ascii_digit() || c == '.' => Some("double"),
            _ => None,
        };
    }

    let suffix_len = lower
        .chars()
        .rev()
        .take_while(|c| matches!(c, 'u' | 'l'))
        .count();
    let suffix = &lower[lower.len() - suffix_len..];
    let digits = &lower[..lower.len() - suffix_len];
    let (radix, digits) = if let Some(rest) = digits.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = digits.strip_prefix("0b") {
        (2, rest)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    let value = u128::from_str_radix(digits, radix).ok()?;
    let decimal = radix == 10;

    const INT: u128 = i32::MAX as u128;
    const UINT: u128 = u32::MAX as u128;
    const LLONG: u128 = i64::MAX as u128;
    const ULLONG: u128 = u64::MAX as u128;
    match suffix {
        "" if value <= INT => Some("int"),
        "" if !decimal && value <= UINT => Some("unsigned int"),
        "u" if value <= UINT => Some("unsigned int"),
        "l" if value <= INT => Some("long"),
        "ul" | "lu" if value <= UINT => Some("unsigned long"),
        "ll" if value <= LLONG => Some("long long"),
        "ll" if !decimal && value <= ULLONG => Some("unsigned long long"),
        "ull" | "llu" if value <= ULLONG => Some("unsigned long long"),
        _ => None,
    }
}

/// Character type named by the encoding prefix of a char literal
pub fn char_type(literal: &str) -> Option<&'static str> {
    let prefix = &literal[..literal.find('\'')?];
    encoding(prefix)
}

/// Character type of a string literal (`R` raw marker ignored)
pub fn string_type(literal: &str) -> Option<&'static str> {
    let prefix = &literal[..literal.find('"')?];
    encoding(prefix.strip_suffix('R').unwrap_or(prefix))
}

fn encoding(prefix: &str) -> Option<&'static str> {
    match prefix {
        "" => Some("char"),
        "u8" => Some("char8_t"),
        "u" => Some("char16_t"),
        "U" => Some("char32_t"),
        "L" => Some("wchar_t"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treesitter::CppFrontEnd;

    #[test]
    fn test_number_suffixes() {
        assert_eq!(number_type("42"), Some("int"));
        assert_eq!(number_type("42u"), Some("unsigned int"));
        assert_eq!(number_type("42L"), Some("long"));
        assert_eq!(number_type("42UL"), Some("unsigned long"));
        assert_eq!(number_type("42ll"), Some("long long"));
        assert_eq!(number_type("42ull"), Some("unsigned long long"));
        assert_eq!(number_type("0xFF"), Some("int"));
        assert_eq!(number_type("1'000'000"), Some("int"));
        assert_eq!(number_type("1.5"), Some("double"));
        assert_eq!(number_type("1e3"), Some("double"));
        assert_eq!(number_type("1.5f"), Some("float"));
        assert_eq!(number_type("1.5L"), Some("long double"));
        assert_eq!(number_type("0x1p3"), Some("double"));
        assert_eq!(number_type("42z"), None);
    }

    #[test]
    fn test_number_magnitude() {
        assert_eq!(number_type("2147483647"), Some("int"));
        assert_eq!(number_type("3000000000"), None);
        assert_eq!(number_type("0xFFFFFFFF"), Some("unsigned int"));
        assert_eq!(number_type("0x100000000"), None);
        assert_eq!(number_type("017"), Some("int"));
        assert_eq!(number_type("0b101"), Some("int"));
        assert_eq!(number_type("019"), None);
        assert_eq!(number_type("3000000000u"), Some("unsigned int"));
        assert_eq!(number_type("3000000000L"), None);
        assert_eq!(number_type("3000000000LL"), Some("long long"));
        assert_eq!(number_type("0xFFFFFFFFFFFFFFFFll"), Some("unsigned long long"));
        assert_eq!(number_type("0"), Some("int"));
    }

    #[test]
    fn test_char_and_string_prefixes() {
        assert_eq!(char_type("'a'"), Some("char"));
        assert_eq!(char_type("L'a'"), Some("wchar_t"));
        assert_eq!(char_type("u8'a'"), Some("char8_t"));
        assert_eq!(string_type("\"x\""), Some("char"));
        assert_eq!(string_type("U\"x\""), Some("char32_t"));
        assert_eq!(string_type("uR\"(x)\""), Some("char16_t"));
        assert_eq!(string_type("R\"(x)\""), Some("char"));
    }

    #[test]
    fn test_deduce_from_tree() {
        let source = "auto a = -1; auto b = \"s\"; auto c = true; auto d = (2.0f); auto e = nullptr; auto f = g();";
        let tree = CppFrontEnd::new().parse_plain(source).unwrap();
        let root = tree.root_node();
        let mut cursor = root.walk();
        let deduced: Vec<Option<String>> = root
            .named_children(&mut cursor)
            .map(|decl| {
                let init = decl.child_by_field_name("declarator").unwrap();
                let value = init.child_by_field_name("value").unwrap();
                deduce_literal(value, source)
            })
            .collect();
        assert_eq!(
            deduced,
            vec![
                Some("int".to_string()),
                Some("const char *".to_string()),
                Some("bool".to_string()),
                Some("float".to_string()),
                Some("std::nullptr_t".to_string()),
                None,
            ]
        );
    }
}
