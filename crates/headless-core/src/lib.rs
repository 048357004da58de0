//! Headless Core
//!
//! Core types, configuration and error handling shared by the headless
//! splitter, the directory synchroniser and the command-line front end.

pub mod config;
pub mod error;
pub mod location;
pub mod types;

pub use config::{Config, SplitConfig, SyncConfig};
pub use error::{Error, Result};
pub use location::LineIndex;
pub use types::*;
