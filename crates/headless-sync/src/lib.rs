//! Headless Sync
//!
//! Mirrors a source tree into an output tree: headers are split into
//! interface and implementation, every other file is copied. Supports
//! incremental updates through a modification-time snapshot.

use headless_core::{Error, Result, SplitConfig, SyncConfig};
use headless_parser::{SplitNames, Splitter};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

mod snapshot;
mod walker;

pub use snapshot::{mtime_secs, Snapshot, SNAPSHOT_FILE};
pub use walker::{relative_path, FileKind, SourceFile, SourceWalker};

/// File name of the generated implementation list
pub const SOURCES_FILE: &str = "sources.txt";

/// One synchronisation run
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub from: PathBuf,
    pub to: PathBuf,
    pub split: SplitConfig,
    pub sync: SyncConfig,
}

/// A file that could not be synchronised
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub path: String,
    pub error: String,
}

/// Outcome of a synchronisation run. Paths are relative to the roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Headers split
    pub split: Vec<String>,
    /// Other files copied
    pub copied: Vec<String>,
    /// Files left alone because the snapshot says they are current
    pub skipped: Vec<String>,
    /// Source files that vanished and had their outputs removed
    pub removed: Vec<String>,
    pub failed: Vec<SyncFailure>,
    /// Implementation files now present in the output
    pub sources: Vec<String>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }

    pub fn summary(&self) -> String {
        format!(
            "{} split, {} copied, {} skipped, {} removed, {} failed",
            self.split.len(),
            self.copied.len(),
            self.skipped.len(),
            self.removed.len(),
            self.failed.len()
        )
    }
}

enum Outcome {
    Split,
    Copied,
}

/// Synchronise `request.to` with `request.from`
pub fn sync(request: &SyncRequest) -> Result<SyncReport> {
    if !request.from.is_dir() {
        return Err(Error::FileNotFound(request.from.display().to_string()));
    }
    fs::create_dir_all(&request.to)?;

    let walker = SourceWalker::new(&request.sync)?;
    // never read back our own output when it lives inside the source tree
    let files: Vec<SourceFile> = walker
        .walk(&request.from)
        .into_iter()
        .filter(|file| !file.path.starts_with(&request.to))
        .collect();
    info!("Found {} files in {}", files.len(), request.from.display());

    let incremental = request.sync.incremental;
    let mut snapshot = if incremental {
        Snapshot::load(&request.to)?
    } else {
        Snapshot::new()
    };

    let mut report = SyncReport::default();
    let mut pending = Vec::new();
    for file in &files {
        let mtime = match mtime_secs(&file.path) {
            Ok(mtime) => mtime,
            Err(e) => {
                warn!("Cannot stat {}: {}", file.path.display(), e);
                report.failed.push(SyncFailure {
                    path: file.rel.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };
        if incremental && snapshot.is_current(&file.rel, mtime) {
            debug!("Up to date: {}", file.rel);
            report.skipped.push(file.rel.clone());
        } else {
            pending.push((file, mtime));
        }
    }

    let total = pending.len();
    let done = AtomicUsize::new(0);
    let results: Vec<(&SourceFile, u64, Result<Outcome>)> = pending
        .par_iter()
        .map_init(
            || Splitter::new(request.split.clone()),
            |splitter, (file, mtime)| {
                let result = sync_file(splitter, file, request);
                let current = done.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("Synced {}/{}: {}", current, total, file.rel);
                (*file, *mtime, result)
            },
        )
        .collect();

    for (file, mtime, result) in results {
        match result {
            Ok(outcome) => {
                snapshot.record(file.rel.clone(), mtime);
                match outcome {
                    Outcome::Split => report.split.push(file.rel.clone()),
                    Outcome::Copied => report.copied.push(file.rel.clone()),
                }
            }
            Err(e) => {
                warn!("Failed to sync {}: {}", file.rel, e);
                snapshot.forget(&file.rel);
                report.failed.push(SyncFailure {
                    path: file.rel.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    if incremental {
        let present: Vec<String> = files.iter().map(|f| f.rel.clone()).collect();
        let vanished: Vec<String> = snapshot.vanished(&present).map(str::to_string).collect();
        for rel in vanished {
            remove_outputs(&request.to, &rel, &request.sync)?;
            snapshot.forget(&rel);
            report.removed.push(rel);
        }
        snapshot.save(&request.to)?;
    }

    report.sources = files
        .iter()
        .filter(|f| f.kind == FileKind::Header)
        .map(|f| implementation_rel(&f.rel, &request.sync.source_extension))
        .filter(|rel| request.to.join(rel).is_file())
        .collect();
    report.sources.sort();
    if request.sync.generate_sources_list {
        let mut listing = report.sources.join("\n");
        if !listing.is_empty() {
            listing.push('\n');
        }
        fs::write(request.to.join(SOURCES_FILE), listing)?;
    }

    info!("Sync of {}: {}", request.from.display(), report.summary());
    Ok(report)
}

fn sync_file(splitter: &mut Splitter, file: &SourceFile, request: &SyncRequest) -> Result<Outcome> {
    let target = request.to.join(&file.rel);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    match file.kind {
        FileKind::Other => {
            fs::copy(&file.path, &target)?;
            Ok(Outcome::Copied)
        }
        FileKind::Header => {
            let source = fs::read_to_string(&file.path)?;
            let interface_name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let names = SplitNames::new(file.path.to_string_lossy(), interface_name);
            let output = splitter.split(&source, &names);

            let implementation =
                request.to.join(implementation_rel(&file.rel, &request.sync.source_extension));
            fs::write(&target, &output.interface)?;
            if output.implementation.is_empty() {
                remove_if_exists(&implementation)?;
            } else {
                fs::write(&implementation, &output.implementation)?;
            }
            info!("Split {} ({} hoisted)", file.rel, output.hoisted);
            Ok(Outcome::Split)
        }
    }
}

/// `dir/a.hpp` -> `dir/a.cpp`
pub fn implementation_rel(rel: &str, extension: &str) -> String {
    let path = Path::new(rel).with_extension(extension);
    path.to_string_lossy().replace('\\', "/")
}

fn remove_outputs(to: &Path, rel: &str, config: &SyncConfig) -> Result<()> {
    info!("Removing outputs of vanished {}", rel);
    remove_if_exists(&to.join(rel))?;
    let is_header = Path::new(rel)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| config.header_extensions.iter().any(|h| h == ext));
    if is_header {
        remove_if_exists(&to.join(implementation_rel(rel, &config.source_extension)))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
