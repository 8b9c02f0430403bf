// LogPeek - core/change.rs
//
// Staleness detection for polling clients. The client remembers the latest
// modification time it has seen; each poll compares it against the current
// catalog and only a mismatch triggers a fresh parse.

use crate::core::model::LogFile;

/// Outcome of comparing a client's timestamp with the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Nothing changed; the client keeps its view.
    Unchanged { latest: i64 },

    /// The client must re-render from a fresh parse.
    Stale { latest: i64 },
}

impl Freshness {
    pub fn latest(&self) -> i64 {
        match self {
            Freshness::Unchanged { latest } | Freshness::Stale { latest } => *latest,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale { .. })
    }
}

/// Maximum modification time over `files` as Unix seconds, 0 when empty.
pub fn latest_modification(files: &[LogFile]) -> i64 {
    files
        .iter()
        .map(LogFile::modified_epoch)
        .max()
        .unwrap_or(0)
        .max(0)
}

/// Compare the client's last-known time with the catalog.
///
/// A 0 on either side always counts as stale so the first poll loads data.
pub fn evaluate(client_last_modified: i64, files: &[LogFile]) -> Freshness {
    let latest = latest_modification(files);
    if client_last_modified == 0 || latest == 0 || client_last_modified != latest {
        Freshness::Stale { latest }
    } else {
        Freshness::Unchanged { latest }
    }
}
