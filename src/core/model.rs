// LogPeek - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no transport
// dependencies. These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// Log level
// =============================================================================

/// The closed set of level tokens a record-start line can begin with.
///
/// Presentation tags are resolved by `match`, so an unmapped level cannot
/// exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Error,
    Debug,
    All,
    Trace,
    Fatal,
}

impl LogLevel {
    /// All variants in the order the classifier's alternation lists them.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Info,
            LogLevel::Error,
            LogLevel::Debug,
            LogLevel::All,
            LogLevel::Trace,
            LogLevel::Fatal,
        ]
    }

    /// The literal token as written in log files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
            LogLevel::All => "ALL",
            LogLevel::Trace => "TRACE",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Icon class shown next to a record of this level.
    pub fn icon(&self) -> &'static str {
        match self {
            LogLevel::Info => "glyphicon glyphicon-info-sign",
            LogLevel::Error => "glyphicon glyphicon-warning-sign",
            LogLevel::Debug => "glyphicon glyphicon-exclamation-sign",
            LogLevel::All => "glyphicon glyphicon-minus",
            LogLevel::Trace => "glyphicon glyphicon-info-sign",
            LogLevel::Fatal => "glyphicon glyphicon-exclamation-sign",
        }
    }

    /// Row style class for a record of this level.
    pub fn css_class(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Error => "danger",
            LogLevel::Debug => "warning",
            LogLevel::All => "muted",
            LogLevel::Trace => "trace",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a token is not one of the six level names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level token '{}'", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    /// Exact, case-sensitive match: `info` is not a level token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::all()
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// =============================================================================
// Log record (output of assembly)
// =============================================================================

/// One logical log event, possibly spanning several physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,

    /// Timestamp text exactly as it appears in the source line.
    pub timestamp: String,

    /// Visible part of the message, bounded by the truncation limit.
    pub message: String,

    /// Text cut from `message` plus any merged continuation lines.
    pub overflow: Option<String>,
}

impl LogRecord {
    pub fn display_icon(&self) -> &'static str {
        self.level.icon()
    }

    pub fn display_class(&self) -> &'static str {
        self.level.css_class()
    }

    /// Append a fragment to the overflow, separated from any existing text.
    pub fn push_overflow(&mut self, fragment: &str) {
        match self.overflow.as_mut() {
            Some(existing) => {
                existing.push_str(crate::util::constants::OVERFLOW_LINE_SEPARATOR);
                existing.push_str(fragment);
            }
            None => self.overflow = Some(fragment.to_string()),
        }
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.overflow.is_some() { 6 } else { 5 };
        let mut state = serializer.serialize_struct("LogRecord", fields)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("displayIcon", self.display_icon())?;
        state.serialize_field("displayClass", self.display_class())?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref overflow) = self.overflow {
            state.serialize_field("overflow", overflow)?;
        } else {
            state.skip_field("overflow")?;
        }
        state.end()
    }
}

// =============================================================================
// Log file (output of catalog listing)
// =============================================================================

/// A file on disk eligible for viewing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Absolute path inside the configured log directory.
    pub path: PathBuf,

    /// Basename shown to users and used to build references.
    pub display_name: String,

    /// Last modification time, if the platform reports one.
    pub modified: Option<DateTime<Utc>>,

    pub size_bytes: u64,
}

impl LogFile {
    /// Opaque reference clients use to name this file.
    pub fn reference(&self) -> String {
        crate::core::discovery::encode_reference(&self.display_name)
    }

    /// Modification time as Unix seconds, 0 when unknown.
    pub fn modified_epoch(&self) -> i64 {
        self.modified.map(|m| m.timestamp()).unwrap_or(0)
    }
}

// =============================================================================
// Parse outcome
// =============================================================================

/// What a view request produced for the selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Records, newest first.
    Records(Vec<LogRecord>),

    /// The file exceeds the size guard; offer a download instead.
    TooLarge,

    /// No file was selected and the catalog is empty.
    NoFile,
}

impl ParseOutcome {
    pub fn records(&self) -> Option<&[LogRecord]> {
        match self {
            ParseOutcome::Records(records) => Some(records),
            _ => None,
        }
    }
}
