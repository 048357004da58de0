//! Source tree walking
//!
//! Finds the files of the source root, classifies them as splittable headers
//! or verbatim copies and applies the exclude globs.

use globset::{Glob, GlobSet, GlobSetBuilder};
use headless_core::{Error, Result, SyncConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// How a source file is synchronised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Split into interface and implementation
    Header,
    /// Copied unchanged
    Other,
}

/// One file below the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated
    pub rel: String,
    pub kind: FileKind,
}

/// Walks a source root
pub struct SourceWalker {
    header_extensions: Vec<String>,
    exclude: GlobSet,
}

impl SourceWalker {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude {
            let glob = Glob::new(pattern)
                .map_err(|e| Error::Config(format!("bad exclude pattern {:?}: {}", pattern, e)))?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| Error::Config(format!("bad exclude patterns: {}", e)))?;

        Ok(Self {
            header_extensions: config.header_extensions.clone(),
            exclude,
        })
    }

    /// Every regular file below `root`, sorted by relative path
    pub fn walk(&self, root: &Path) -> Vec<SourceFile> {
        let mut files: Vec<SourceFile> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let rel = relative_path(root, entry.path())?;
                if self.exclude.is_match(&rel) {
                    debug!("Excluded {}", rel);
                    return None;
                }
                Some(SourceFile {
                    kind: self.kind_of(entry.path()),
                    path: entry.into_path(),
                    rel,
                })
            })
            .collect();

        files.sort_by(|a, b| a.rel.cmp(&b.rel));
        files
    }

    fn kind_of(&self, path: &Path) -> FileKind {
        let is_header = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.header_extensions.iter().any(|h| h == ext))
            .unwrap_or(false);
        if is_header {
            FileKind::Header
        } else {
            FileKind::Other
        }
    }
}

/// `path` relative to `root`, joined with `/`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
