// LogPeek - core/size_guard.rs
//
// Size check applied before any line of a file is read.

use crate::util::constants;

/// Whether a file may be parsed inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeVerdict {
    Within,
    TooLarge,
}

/// Rejects files above a byte threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGuard {
    pub max_bytes: u64,
}

impl Default for SizeGuard {
    fn default() -> Self {
        Self {
            max_bytes: constants::DEFAULT_MAX_LOG_SIZE,
        }
    }
}

impl SizeGuard {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// `None` (size unknown) and `Some(0)` are treated as too large so that a
    /// missing size never leads to an unbounded read.
    pub fn check(&self, size: Option<u64>) -> SizeVerdict {
        match size {
            Some(bytes) if bytes > 0 && bytes <= self.max_bytes => SizeVerdict::Within,
            _ => SizeVerdict::TooLarge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: u64 = 52_428_800;

    #[test]
    fn test_default_threshold_is_fifty_mebibytes() {
        assert_eq!(SizeGuard::default().max_bytes, THRESHOLD);
    }

    #[test]
    fn test_threshold_boundary() {
        let guard = SizeGuard::default();
        assert_eq!(guard.check(Some(THRESHOLD)), SizeVerdict::Within);
        assert_eq!(guard.check(Some(THRESHOLD + 1)), SizeVerdict::TooLarge);
        assert_eq!(guard.check(Some(60_000_000)), SizeVerdict::TooLarge);
        assert_eq!(guard.check(Some(1)), SizeVerdict::Within);
    }

    #[test]
    fn test_zero_and_unknown_sizes_are_rejected() {
        let guard = SizeGuard::default();
        assert_eq!(guard.check(Some(0)), SizeVerdict::TooLarge);
        assert_eq!(guard.check(None), SizeVerdict::TooLarge);
    }
}
