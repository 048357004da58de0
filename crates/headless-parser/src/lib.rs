//! Headless Parser
//!
//! Splits a header-only C++ translation unit into an interface (the original
//! text with bodies and initializers removed) and an implementation holding
//! the removed definitions, each wrapped in the conditional it came from.
//!
//! ## Modules
//!
//! - `preprocessor` - Conditional directive scanning and guard normalization
//! - `treesitter` - C++ parsing around directive lines using tree-sitter
//! - `decl` - Closed classification of declaration nodes
//! - `deduce` - Placeholder type deduction from literals
//! - `hoist` - Moves definitions out of the syntax tree
//! - `rewrite` - Offset-based edit scripts
//! - `lines` - `#line` marker reinjection
//! - `outline` - Declaration-only rendering of a whole header

pub mod decl;
pub mod deduce;
pub mod hoist;
pub mod lines;
pub mod outline;
pub mod preprocessor;
pub mod rewrite;
pub mod treesitter;

use headless_core::{Error, Result, SplitConfig, SplitOutput};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::hoist::Hoister;
use crate::lines::{LineCursor, LineMarkers};
use crate::preprocessor::ConditionalScanner;
use crate::treesitter::CppFrontEnd;

/// Names written into the generated files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitNames {
    /// Path `#line` markers point at
    pub source_path: String,
    /// Path of the interface as included by the implementation
    pub interface_name: String,
}

impl SplitNames {
    pub fn new(source_path: impl Into<String>, interface_name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            interface_name: interface_name.into(),
        }
    }

    /// Interface keeps the file name of the original header
    pub fn for_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(path.to_string_lossy(), name)
    }
}

/// Header splitter
///
/// Owns its scanner and tree-sitter parser; one instance per thread.
pub struct Splitter {
    scanner: ConditionalScanner,
    front_end: CppFrontEnd,
    config: SplitConfig,
}

impl Splitter {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            scanner: ConditionalScanner::new(),
            front_end: CppFrontEnd::new(),
            config,
        }
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Split an in-memory header
    pub fn split(&mut self, source: &str, names: &SplitNames) -> SplitOutput {
        let scan = self.scanner.scan(source);
        let Some(tree) = self.front_end.parse(source, &scan) else {
            warn!("No syntax tree for {}, passing it through", names.source_path);
            return SplitOutput::passthrough(source);
        };

        let markers = self
            .config
            .emit_line_directives
            .then(|| LineMarkers::new(names.source_path.as_str(), source));
        let hoisted = Hoister::new(source, &scan.timeline, markers.as_ref()).hoist(&tree);

        let mut interface = hoisted.edits.apply(source);
        if let Some(markers) = &markers {
            interface = markers.reinject(
                &interface,
                |offset| hoisted.edits.original_offset(offset),
                &mut LineCursor::new(),
                false,
            );
        }
        if self.config.wrap_in_include_guard {
            let guard = include_guard_name(&names.interface_name, self.config.salt_include_guard);
            interface = wrap_in_include_guard(&interface, &guard);
        }

        let mut implementation = String::new();
        if !hoisted.units.is_empty() {
            implementation.push_str(&format!("#include \"{}\"\n\n", names.interface_name));
            for unit in &hoisted.units {
                unit.emit(&mut implementation);
            }
        }

        debug!(
            "Split {}: {} units, {} edits",
            names.source_path,
            hoisted.units.len(),
            hoisted.edits.len()
        );
        SplitOutput {
            interface,
            implementation,
            hoisted: hoisted.units.len(),
            edits: hoisted.edits.len(),
        }
    }

    /// Read and split a header file
    pub fn split_file(&mut self, path: &Path, names: &SplitNames) -> Result<SplitOutput> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let source = std::fs::read_to_string(path)?;
        info!("Splitting {}", path.display());
        Ok(self.split(&source, names))
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(SplitConfig::default())
    }
}

/// Split `source` with a throwaway [`Splitter`]
pub fn split(source: &str, names: &SplitNames, config: &SplitConfig) -> SplitOutput {
    Splitter::new(config.clone()).split(source, names)
}

/// `HEADER_<FILE_NAME>`, optionally salted with a hash of the whole path
pub fn include_guard_name(interface_name: &str, salt: bool) -> String {
    let file_name = Path::new(interface_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| interface_name.to_string());
    let mut guard = String::from("HEADER_");
    guard.extend(file_name.chars().map(|c| {
        if c.is_ascii_alphanumeric() {
            c.to_ascii_uppercase()
        } else {
            '_'
        }
    }));
    if salt {
        let mut hasher = DefaultHasher::new();
        interface_name.hash(&mut hasher);
        guard.push_str(&format!("_{:08X}", hasher.finish() as u32));
    }
    guard
}

fn wrap_in_include_guard(interface: &str, guard: &str) -> String {
    let mut out = format!("#ifndef {0}\n#define {0}\n\n", guard);
    out.push_str(interface);
    if !interface.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("\n#endif // {}\n", guard));
    out
}

#[cfg(test)]
mod tests;
