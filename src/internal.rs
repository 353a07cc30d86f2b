//! Exports intended for internal use only.
//!
//! These need to be exported for access from the CLI and the `devtools`
//! binaries, but they are not intended for use by external code. This module's
//! API may change without semantic versioning!

pub mod report;

pub use crate::algorithm::insertion_scores;
