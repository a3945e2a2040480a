//! Options controlling a full status enumeration.

use git2::{StatusOptions, StatusShow};
use serde::{Deserialize, Serialize};

/// Which entries a full scan asks the repository to report.
///
/// The defaults enumerate the index and working tree, including ignored,
/// untracked, and unmodified entries, so that every tracked item the
/// repository knows about is reported explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Report ignored entries.
    pub include_ignored: bool,
    /// Report untracked entries.
    pub include_untracked: bool,
    /// Report entries with no changes.
    pub include_unmodified: bool,
    /// Descend into untracked directories instead of reporting the directory.
    pub recurse_untracked_dirs: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_ignored: true,
            include_untracked: true,
            include_unmodified: true,
            recurse_untracked_dirs: false,
        }
    }
}

impl ScanOptions {
    /// Build the equivalent `git2` status options.
    pub fn to_status_options(&self) -> StatusOptions {
        let mut opts = StatusOptions::new();
        opts.show(StatusShow::IndexAndWorkdir)
            .include_ignored(self.include_ignored)
            .include_untracked(self.include_untracked)
            .include_unmodified(self.include_unmodified)
            .recurse_untracked_dirs(self.recurse_untracked_dirs);
        opts
    }
}
