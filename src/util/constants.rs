// LogPeek - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogPeek";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogPeek";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Catalog defaults
// =============================================================================

/// Directory searched for log files when none is configured.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Glob pattern (filename only) selecting log files inside the log directory.
/// Matches the CodeIgniter default of one `log-YYYY-MM-DD.php` file per day.
pub const DEFAULT_FILE_PATTERN: &str = "log-*.php";

/// Reserved reference value meaning "every file in the catalog" for deletes.
pub const DELETE_ALL_REFERENCE: &str = "all";

// =============================================================================
// Parsing limits
// =============================================================================

/// Files larger than this are never parsed inline; the caller is told to
/// download them instead.
pub const DEFAULT_MAX_LOG_SIZE: u64 = 50 * 1024 * 1024; // 50 MiB

/// Number of characters of a record message shown before the rest is moved
/// to the record's overflow.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 300;

/// Hard cap on records returned for one file.
pub const DEFAULT_MAX_RECORDS: usize = 5_000;

/// Lower bounds for user-configurable limits (controls must be non-zero).
pub const MIN_MAX_LOG_SIZE: u64 = 1;
pub const MIN_MAX_MESSAGE_CHARS: usize = 1;
pub const MIN_MAX_RECORDS: usize = 1;

/// Upper bound on the configurable size guard.
pub const ABSOLUTE_MAX_LOG_SIZE: u64 = 1024 * 1024 * 1024; // 1 GiB

/// Upper bound on the configurable record cap.
pub const ABSOLUTE_MAX_RECORDS: usize = 100_000;

/// Upper bound on the configurable visible message length.
pub const ABSOLUTE_MAX_MESSAGE_CHARS: usize = 64 * 1024;

/// Joins overflow fragments (truncated tail and continuation lines).
pub const OVERFLOW_LINE_SEPARATOR: &str = "\n";

// =============================================================================
// API wire values
// =============================================================================

/// Body of the `logs` field when a file exceeds the size guard.
pub const TOO_LARGE_MESSAGE: &str = "File Size too Large. Please download it locally";

// =============================================================================
// Server
// =============================================================================

/// Address the HTTP server binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
