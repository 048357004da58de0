//! Scenario tests for the splitter
//!
//! These run whole headers through the pipeline and check both outputs.

use super::*;
use pretty_assertions::assert_eq;

fn names(file: &str) -> SplitNames {
    SplitNames::new(file, file)
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

const IFDEF_INPUT: &str = r#"#include <stdio.h>

#define A 1
#define B 2

class Class {

/* test comment */ #ifdef A
    void methodA(int a = 1, int b = 2) {
        printf("a = %d, b = %d\n", a, b);
    }

#elif defined(B)
    int methodB(bool a = true) {
        printf("a = %d\n", a);
    }
#else

    int methodC(bool a = true) {
        printf("a = %d\n", a);
    }
#endif

// #ifdef muted
    int methodD() {
        printf("methodD\n");
    }
// #endif

};"#;

/// Test guard normalization for an #ifdef / #elif / #else chain
#[test]
fn test_ifdef_chain() {
    let output = Splitter::default().split(IFDEF_INPUT, &names("expect.hpp"));

    let expected = r#"#include "expect.hpp"

#if defined(A)
void Class::methodA(int a, int b) {
    printf("a = %d, b = %d\n", a, b);
};
#endif
#if !defined(A) && defined(B)
int Class::methodB(bool a) {
    printf("a = %d\n", a);
};
#endif
#if !(defined(A) || defined(B))
int Class::methodC(bool a) {
    printf("a = %d\n", a);
};
#endif
int Class::methodD() {
    printf("methodD\n");
};"#;
    assert_eq!(normalize(&output.implementation), normalize(expected));
    assert_eq!(output.hoisted, 4);

    // directives and comments stay in the interface
    assert!(output.interface.contains("/* test comment */ #ifdef A"));
    assert!(output.interface.contains("#elif defined(B)"));
    assert!(output.interface.contains("// #ifdef muted"));
    assert!(output.interface.contains("    void methodA(int a = 1, int b = 2);\n"));
    assert!(output.interface.contains("    int methodD();\n"));
    assert!(!output.interface.contains("printf"));
}

/// Test the simple class: defaults erased, const accessor kept
#[test]
fn test_simple_class() {
    let source = r#"#include <stdio.h>

class Class {
  void method() {
    printf("hello world!\n");
  }

  void method2(
    const int& a = 1,
    const int& b = 2
  ) {
    printf("hello, sum of %d and %d: %d!\n", a, b, a + b);
  }

  const int method3() const {
    return 1;
  }
};"#;
    let output = Splitter::default().split(source, &names("simple.hpp"));

    assert_eq!(
        output.interface,
        r#"#include <stdio.h>

class Class {
  void method();

  void method2(
    const int& a = 1,
    const int& b = 2
  );

  const int method3() const;
};"#
    );
    assert_eq!(
        output.implementation,
        r#"#include "simple.hpp"

void Class::method() {
    printf("hello world!\n");
  };
void Class::method2(const int& a, const int& b) {
    printf("hello, sum of %d and %d: %d!\n", a, b, a + b);
  };
const int Class::method3() const {
    return 1;
  };
"#
    );
    assert_eq!(output.edits, 3);
}

/// Test that splitting an interface again changes nothing
#[test]
fn test_idempotent_on_interface() {
    let mut splitter = Splitter::default();
    let first = splitter.split(IFDEF_INPUT, &names("expect.hpp"));
    let second = splitter.split(&first.interface, &names("expect.hpp"));

    assert_eq!(second.edits, 0);
    assert_eq!(second.hoisted, 0);
    assert_eq!(second.implementation, "");
    assert_eq!(second.interface, first.interface);
}

/// Test that a header without definitions passes through untouched
#[test]
fn test_nothing_to_hoist() {
    let source = "#pragma once\nstruct S { int f(); };\ninline int g() { return 1; }\n";
    let output = split(source, &names("s.hpp"), &SplitConfig::default());
    assert_eq!(output.interface, source);
    assert_eq!(output.implementation, "");
}

/// Test nested conditionals producing a conjunction
#[test]
fn test_nested_guards() {
    let source = "#ifdef A\n#if B > 1\nint f() { return 1; }\n#endif\nint g() { return 2; }\n#endif\nint h() { return 3; }\n";
    let output = Splitter::default().split(source, &names("n.hpp"));
    assert_eq!(
        output.implementation,
        "#include \"n.hpp\"\n\n#if defined(A) && (B > 1)\nint f() { return 1; };\n#endif\n#if defined(A)\nint g() { return 2; };\n#endif\nint h() { return 3; };\n"
    );
}

/// Test that the file's own include guard never wraps a definition
#[test]
fn test_include_guard_is_transparent() {
    let source = "#ifndef FOO_H\n#define FOO_H\n#ifdef A\nint f() { return 1; }\n#endif\nint g() { return 2; }\n#endif\n";
    let output = Splitter::default().split(source, &names("foo.h"));
    assert_eq!(
        output.implementation,
        "#include \"foo.h\"\n\n#if defined(A)\nint f() { return 1; };\n#endif\nint g() { return 2; };\n"
    );
    assert!(output.interface.starts_with("#ifndef FOO_H\n#define FOO_H\n"));
}

/// Test namespace variables, auto deduction and static data members
#[test]
fn test_variables() {
    let source = "namespace cfg {\nint a = 1, b;\nauto name = \"x\";\nstruct S { static int n = 2; };\n}\n";
    let output = Splitter::default().split(source, &names("v.hpp"));
    assert_eq!(
        output.interface,
        "namespace cfg {\nextern int a, b;\nextern const char * name;\nstruct S { static int n; };\n}\n"
    );
    assert_eq!(
        output.implementation,
        "#include \"v.hpp\"\n\nint cfg::a = 1;\nint cfg::b;\nconst char * cfg::name = \"x\";\nint cfg::S::n = 2;\n"
    );
}

/// Test #line markers in both outputs
#[test]
fn test_line_markers() {
    let source = "struct S {\n  int f() {\n    return 1;\n  }\n  int g;\n};\n";
    let config = SplitConfig {
        emit_line_directives: true,
        ..Default::default()
    };
    let output = split(source, &names("s.hpp"), &config);
    assert_eq!(
        output.interface,
        "#line 1 \"s.hpp\"\nstruct S {\n  int f();\n#line 5 \"s.hpp\"\n  int g;\n};\n"
    );
    assert_eq!(
        output.implementation,
        "#include \"s.hpp\"\n\n#line 2 \"s.hpp\"\nint S::f() {\n    return 1;\n  };\n"
    );
}

/// Test include guard wrapping of the interface
#[test]
fn test_wrap_in_include_guard() {
    let config = SplitConfig {
        wrap_in_include_guard: true,
        ..Default::default()
    };
    let output = split("int f();", &names("dir/my-lib.hpp"), &config);
    assert_eq!(
        output.interface,
        "#ifndef HEADER_MY_LIB_HPP\n#define HEADER_MY_LIB_HPP\n\nint f();\n\n#endif // HEADER_MY_LIB_HPP\n"
    );
}

#[test]
fn test_include_guard_name() {
    assert_eq!(include_guard_name("a.hpp", false), "HEADER_A_HPP");
    assert_eq!(include_guard_name("x/y/My.Header.h", false), "HEADER_MY_HEADER_H");

    let salted = include_guard_name("x/y/a.hpp", true);
    let salt = salted.strip_prefix("HEADER_A_HPP_").unwrap();
    assert_eq!(salt.len(), 8);
    assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(salted, include_guard_name("x/y/a.hpp", true));
    assert_ne!(salted, include_guard_name("z/a.hpp", true));
}

#[test]
fn test_split_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("t.hpp");
    std::fs::write(&path, "int f() { return 1; }\n").unwrap();

    let mut splitter = Splitter::default();
    let output = splitter.split_file(&path, &SplitNames::for_path(&path)).unwrap();
    assert_eq!(output.interface, "int f();\n");
    assert!(output.implementation.starts_with("#include \"t.hpp\"\n"));

    let missing = splitter.split_file(&dir.path().join("missing.hpp"), &names("missing.hpp"));
    assert!(matches!(missing, Err(Error::FileNotFound(_))));
}
