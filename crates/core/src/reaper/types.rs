//! Reaper types.

use serde::Serialize;

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReapReport {
    /// Sessions evicted for age.
    pub evicted: usize,
    /// Backing files deleted.
    pub files_removed: usize,
    /// Sessions whose recorded file was already gone.
    pub files_missing: usize,
    /// File deletions that failed (logged, not propagated).
    pub failures: usize,
}

impl ReapReport {
    pub fn is_empty(&self) -> bool {
        self.evicted == 0
    }
}
