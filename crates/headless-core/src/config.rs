//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Headless configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Options for splitting a single translation unit
    pub split: SplitConfig,

    /// Options for directory synchronisation
    pub sync: SyncConfig,
}

impl Config {
    /// Parse a configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.sync.header_extensions.is_empty() {
            return Err(Error::Config("header_extensions must not be empty".into()));
        }
        if self.sync.source_extension.trim().is_empty() {
            return Err(Error::Config("source_extension must not be empty".into()));
        }
        Ok(())
    }
}

/// Splitter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Emit `#line` markers pointing back at the original header
    pub emit_line_directives: bool,

    /// Wrap the interface output in an `#ifndef/#define/#endif` guard
    pub wrap_in_include_guard: bool,

    /// Append a hash of the output path to the include guard name
    pub salt_include_guard: bool,
}

/// Directory synchronisation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Only re-process files whose modification time changed
    pub incremental: bool,

    /// Write `sources.txt` listing the generated implementation files
    pub generate_sources_list: bool,

    /// Extensions treated as splittable headers
    pub header_extensions: Vec<String>,

    /// Extension of generated implementation files
    pub source_extension: String,

    /// Glob patterns (relative to the source root) to skip
    pub exclude: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            incremental: false,
            generate_sources_list: false,
            header_extensions: vec!["hpp".into(), "h".into(), "hh".into(), "hxx".into()],
            source_extension: "cpp".into(),
            exclude: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = Config::from_yaml_str(
            r#"
split:
  emit_line_directives: true
sync:
  exclude: ["third_party/**"]
"#,
        )
        .unwrap();

        assert!(config.split.emit_line_directives);
        assert!(!config.split.wrap_in_include_guard);
        assert_eq!(config.sync.exclude, vec!["third_party/**".to_string()]);
        assert_eq!(config.sync.source_extension, "cpp");
        assert!(config.sync.header_extensions.contains(&"hpp".to_string()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Config::from_yaml_str("sync:\n  header_extensions: []\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_yaml_file(Path::new("/nonexistent/headless.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("headless.yaml");
        std::fs::write(&path, "split:\n  wrap_in_include_guard: true\n").unwrap();

        let config = Config::from_yaml_file(&path).unwrap();
        assert!(config.split.wrap_in_include_guard);
    }
}
