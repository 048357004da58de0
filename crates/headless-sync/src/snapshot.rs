//! Modification-time snapshot
//!
//! Remembers when each source file was last processed so an incremental sync
//! only touches files that changed. Stored as `.snapshot.txt` in the output
//! directory, one `<mtime-secs>\t<relative-path>` line per file.

use headless_core::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

/// File name of the snapshot inside the output directory
pub const SNAPSHOT_FILE: &str = ".snapshot.txt";

/// Last processed modification time per relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<String, u64>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse snapshot text; malformed lines are skipped
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let Some((mtime, path)) = line.split_once('\t') else {
                if !line.trim().is_empty() {
                    warn!("Skipping malformed snapshot line: {:?}", line);
                }
                continue;
            };
            match mtime.trim().parse::<u64>() {
                Ok(mtime) => {
                    entries.insert(path.to_string(), mtime);
                }
                Err(_) => warn!("Skipping snapshot line with bad time: {:?}", line),
            }
        }
        Self { entries }
    }

    /// Load the snapshot of `dir`; a missing file is an empty snapshot
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SNAPSHOT_FILE);
        if !path.exists() {
            debug!("No snapshot at {}", path.display());
            return Ok(Self::new());
        }
        let text = std::fs::read_to_string(&path)?;
        Ok(Self::parse(&text))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::write(dir.join(SNAPSHOT_FILE), self.render())?;
        Ok(())
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(path, mtime)| format!("{}\t{}\n", mtime, path))
            .collect()
    }

    /// Whether `rel` was processed at exactly `mtime`
    pub fn is_current(&self, rel: &str, mtime: u64) -> bool {
        self.entries.get(rel) == Some(&mtime)
    }

    pub fn record(&mut self, rel: impl Into<String>, mtime: u64) {
        self.entries.insert(rel.into(), mtime);
    }

    pub fn forget(&mut self, rel: &str) {
        self.entries.remove(rel);
    }

    /// Recorded paths missing from `present`
    pub fn vanished<'a>(&'a self, present: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .keys()
            .filter(move |rel| !present.contains(rel))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Modification time in whole seconds since the epoch
pub fn mtime_secs(path: &Path) -> Result<u64> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs())
}
