// LogPeek - core/parser.rs
//
// Record assembly: turns the physical lines of one log file into a bounded,
// newest-first list of structured records.
// Core layer: accepts already-read lines, never touches the filesystem.

use crate::core::classify::{self, LineKind};
use crate::core::model::LogRecord;
use crate::core::truncate;
use crate::util::logging::preview;

/// Configuration for parsing operations.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Visible message length in characters; the rest goes to overflow.
    pub max_message_chars: usize,
    /// Maximum number of records returned for one file.
    pub max_records: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            max_message_chars: constants::DEFAULT_MAX_MESSAGE_CHARS,
            max_records: constants::DEFAULT_MAX_RECORDS,
        }
    }
}

/// Assemble records from `lines`, given oldest-first as they sit on disk.
///
/// Lines are walked newest-first. Continuation lines are buffered until the
/// record-start line that precedes them on disk is reached, then appended to
/// that record's overflow in walk order (newest continuation first, after any
/// truncated message tail). Continuation lines above the first record start
/// of the file are dropped: that content was not written through the logger.
///
/// Stops as soon as `config.max_records` records exist.
pub fn assemble<S: AsRef<str>>(lines: &[S], config: &ParseConfig) -> Vec<LogRecord> {
    let mut records: Vec<LogRecord> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut lines_visited: usize = 0;

    for line in lines.iter().rev().map(AsRef::as_ref) {
        if records.len() >= config.max_records {
            break;
        }
        lines_visited += 1;

        match classify::classify(line) {
            LineKind::RecordStart {
                level,
                timestamp,
                remainder,
            } => {
                let (message, overflow) = truncate::truncate(remainder, config.max_message_chars);
                let mut record = LogRecord {
                    level,
                    timestamp,
                    message,
                    overflow,
                };
                for fragment in pending.drain(..) {
                    record.push_overflow(fragment);
                }
                records.push(record);
            }
            LineKind::Continuation(text) => pending.push(text),
        }
    }

    if !pending.is_empty() && records.len() < config.max_records {
        tracing::trace!(
            discarded = pending.len(),
            first = preview(pending[0]),
            "Dropping lines that precede the first record"
        );
    }

    tracing::debug!(
        records = records.len(),
        lines = lines.len(),
        lines_visited,
        capped = records.len() >= config.max_records,
        "Assembly complete"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::LogLevel;

    fn parse(lines: &[&str]) -> Vec<LogRecord> {
        assemble(lines, &ParseConfig::default())
    }

    #[test]
    fn test_single_record_with_continuation() {
        let records = parse(&["INFO - 2024-01-01 10:00:00 --> hello", "world (continued)"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[0].timestamp, "2024-01-01 10:00:00");
        assert_eq!(records[0].message, "hello");
        assert_eq!(records[0].overflow.as_deref(), Some("world (continued)"));
    }

    #[test]
    fn test_newest_first() {
        let records = parse(&["ERROR - 2024-01-01 10:00:00 --> a", "INFO - 2024-01-01 10:00:01 --> b"]);
        let got: Vec<_> = records
            .iter()
            .map(|r| (r.level, r.message.as_str()))
            .collect();
        assert_eq!(got, vec![(LogLevel::Info, "b"), (LogLevel::Error, "a")]);
    }

    #[test]
    fn test_letter_timestamps_do_not_start_records() {
        // The separator run after the level only admits digits, whitespace
        // and `-:./`, so `t1` is not a timestamp.
        assert!(parse(&["ERROR - t1 --> a", "INFO - t2 --> b"]).is_empty());
        let records = parse(&["INFO - 2024-01-01 10:00:00 --> a", "ERROR - t2 --> b"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].overflow.as_deref(), Some("ERROR - t2 --> b"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse(&[]).is_empty());
    }

    #[test]
    fn test_only_continuation_lines() {
        assert!(parse(&["just text", "more text", "#0 stack frame"]).is_empty());
    }

    #[test]
    fn test_leading_header_is_discarded() {
        let records = parse(&[
            "<?php defined('BASEPATH') OR exit('No direct script access allowed'); ?>",
            "secret=hunter2",
            "INFO - 2024-01-01 10:00:00 --> first",
        ]);
        assert_eq!(records.len(), 1);
        assert!(records[0].overflow.is_none());
        assert!(records
            .iter()
            .all(|r| !r.message.contains("hunter2") && r.overflow.is_none()));
    }

    #[test]
    fn test_continuations_attach_to_preceding_record_newest_first() {
        let records = parse(&[
            "ERROR - 2024-01-01 10:00:00 --> Uncaught exception",
            "#0 frame zero",
            "#1 frame one",
            "INFO - 2024-01-01 10:00:01 --> recovered",
        ]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "recovered");
        assert!(records[0].overflow.is_none());
        assert_eq!(records[1].message, "Uncaught exception");
        assert_eq!(
            records[1].overflow.as_deref(),
            Some("#1 frame one\n#0 frame zero")
        );
    }

    #[test]
    fn test_truncated_tail_precedes_continuations() {
        let config = ParseConfig {
            max_message_chars: 5,
            ..ParseConfig::default()
        };
        let records = assemble(&["INFO - 2024-01-01 10:00:00 --> abcde_fgh", "cont"], &config);
        assert_eq!(records[0].message, "abcde");
        assert_eq!(records[0].overflow.as_deref(), Some("fgh\ncont"));
    }

    #[test]
    fn test_record_cap_keeps_newest() {
        let lines: Vec<String> = (0..50)
            .map(|i| format!("DEBUG - 2024-01-01 10:00:{i:02} --> line {i}"))
            .collect();
        let config = ParseConfig {
            max_records: 10,
            ..ParseConfig::default()
        };
        let records = assemble(&lines, &config);
        assert_eq!(records.len(), 10);
        assert_eq!(records[0].message, "line 49");
        assert_eq!(records[9].message, "line 40");
    }

    #[test]
    fn test_cap_never_exceeded_with_mixed_lines() {
        let mut lines = Vec::new();
        for i in 0..200 {
            lines.push(format!("TRACE - 2024-01-01 --> {i}"));
            lines.push(format!("detail {i}"));
        }
        let config = ParseConfig {
            max_records: 7,
            ..ParseConfig::default()
        };
        let records = assemble(&lines, &config);
        assert_eq!(records.len(), 7);
        assert_eq!(records[0].overflow.as_deref(), Some("detail 199"));
    }

    #[test]
    fn test_empty_remainder_gives_empty_message() {
        let records = parse(&["FATAL - 2024-01-01 10:00:00 -->"]);
        assert_eq!(records[0].message, "");
        assert_eq!(records[0].level, LogLevel::Fatal);
    }
}
