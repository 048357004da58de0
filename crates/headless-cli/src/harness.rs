//! Fixture harness
//!
//! Runs the splitter over a directory of fixture cases. Each case is a
//! sub-directory holding `input.hpp`, `expect.hpp` and `expect.cpp`; outputs
//! are compared with whitespace runs collapsed. Failing cases leave
//! `.result.hpp` / `.result.cpp` next to their fixtures.

use anyhow::{Context, Result};
use headless_core::SplitConfig;
use headless_parser::{SplitNames, Splitter};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Outcome of one fixture case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    pub millis: u128,
}

impl CaseResult {
    pub fn line(&self) -> String {
        if self.passed {
            format!("Test \"{}\": ✅ Success ({}ms)", self.name, self.millis)
        } else {
            format!("Test \"{}\": ❌ Failed ({}ms)", self.name, self.millis)
        }
    }
}

/// Run every case below `dir`, in name order
pub fn run(dir: &Path) -> Result<Vec<CaseResult>> {
    let mut cases: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read fixture directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    cases.sort();

    let mut splitter = Splitter::new(SplitConfig::default());
    let mut results = Vec::new();
    for case in cases {
        if let Some(result) = run_case(&mut splitter, &case)? {
            results.push(result);
        }
    }
    Ok(results)
}

fn run_case(splitter: &mut Splitter, case: &Path) -> Result<Option<CaseResult>> {
    let result_hpp = case.join(".result.hpp");
    let result_cpp = case.join(".result.cpp");
    for stale in [&result_hpp, &result_cpp] {
        if stale.exists() {
            fs::remove_file(stale)?;
        }
    }

    let read = |name: &str| fs::read_to_string(case.join(name)).ok();
    let (Some(input), Some(expect_hpp), Some(expect_cpp)) =
        (read("input.hpp"), read("expect.hpp"), read("expect.cpp"))
    else {
        debug!("Skipping incomplete fixture {}", case.display());
        return Ok(None);
    };
    let name = case
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let start = Instant::now();
    let output = splitter.split(&input, &SplitNames::new("input.hpp", "expect.hpp"));
    let millis = start.elapsed().as_millis();

    let passed = normalize(&output.interface) == normalize(&expect_hpp)
        && normalize(&output.implementation) == normalize(&expect_cpp);
    if !passed {
        fs::write(&result_hpp, &output.interface)?;
        fs::write(&result_cpp, &output.implementation)?;
    }

    Ok(Some(CaseResult {
        name,
        passed,
        millis,
    }))
}

/// Collapse whitespace runs to one space and trim
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn case(root: &Path, name: &str, input: &str, hpp: &str, cpp: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("input.hpp"), input).unwrap();
        fs::write(dir.join("expect.hpp"), hpp).unwrap();
        fs::write(dir.join("expect.cpp"), cpp).unwrap();
    }

    #[test]
    fn test_pass_fail_and_results() {
        let root = TempDir::new().unwrap();
        case(
            root.path(),
            "good",
            "int f() { return 1; }\n",
            "int f();",
            "#include \"expect.hpp\"\n\n  int f()   { return 1; };",
        );
        case(root.path(), "bad", "int f() { return 1; }\n", "int f() {}", "");
        fs::create_dir_all(root.path().join("incomplete")).unwrap();

        let results = run(root.path()).unwrap();
        let summary: Vec<(&str, bool)> =
            results.iter().map(|r| (r.name.as_str(), r.passed)).collect();
        assert_eq!(summary, vec![("bad", false), ("good", true)]);

        let bad = root.path().join("bad");
        assert_eq!(fs::read_to_string(bad.join(".result.hpp")).unwrap(), "int f();\n");
        assert!(!root.path().join("good").join(".result.hpp").exists());
    }

    #[test]
    fn test_stale_results_removed() {
        let root = TempDir::new().unwrap();
        case(root.path(), "ok", "int x;\n", "int x;\n", "");
        fs::write(root.path().join("ok").join(".result.cpp"), "old").unwrap();

        let results = run(root.path()).unwrap();
        assert!(results[0].passed);
        assert!(!root.path().join("ok").join(".result.cpp").exists());
    }

    #[test]
    fn test_case_line() {
        let result = CaseResult {
            name: "simple".into(),
            passed: true,
            millis: 3,
        };
        assert_eq!(result.line(), "Test \"simple\": ✅ Success (3ms)");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  a\n\tb   c \n"), "a b c");
    }
}
