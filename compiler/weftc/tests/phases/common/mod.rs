//! Shared helpers for phase tests.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use weft_eval::PrintTarget;
use weft_expand::{expand_with, ExpandError, ExpandOptions};

/// Expand with macro output discarded.
pub fn expand(source: &str) -> String {
    try_expand(source).unwrap()
}

pub fn try_expand(source: &str) -> Result<String, ExpandError> {
    expand_with(source, &ExpandOptions::new().print_target(PrintTarget::Silent))
}

/// Write `source` to a file in a fresh directory. Keep the directory alive
/// while the file is used.
pub fn source_file(source: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.wf");
    fs::write(&path, source).unwrap();
    (dir, path)
}
