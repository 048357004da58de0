//! Conditional compilation handling
//!
//! This module recovers the conditional-compilation structure of a header
//! without running a preprocessor: directives are located on a
//! comment-blanked view, normalized into guard expressions and recorded by
//! source offset.

pub mod comments;
pub mod guards;
pub mod scanner;

pub use comments::strip_comments;
pub use guards::{GuardRule, GuardTimeline};
pub use scanner::{scan, ConditionalScanner, ScanResult};
