// LogPeek - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every variant keeps its cause so the
// full chain can be logged.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogPeek operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogPeekError {
    /// Catalog lookup, listing, or file management failed.
    Catalog(CatalogError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// The HTTP server could not bind or stopped with an error.
    Server { addr: String, source: io::Error },

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogPeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(e) => write!(f, "Catalog error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Server { addr, source } => write!(f, "HTTP server on {addr}: {source}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogPeekError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Server { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

/// Errors related to the log file catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The configured log directory does not exist.
    DirectoryNotFound { path: PathBuf },

    /// The configured file pattern is not a valid glob.
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// A client-supplied file reference is empty, not base64, not UTF-8, or
    /// does not name a file.
    InvalidReference { reference: String, reason: String },

    /// The reference decoded fine but no regular file of that name exists.
    NotFound { name: String },

    /// The file was found but vanished or became unreadable afterwards.
    Unreadable { path: PathBuf, source: io::Error },
}

impl CatalogError {
    /// True for the variants a caller should present as "no such file".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Unreadable { .. } | Self::DirectoryNotFound { .. }
        )
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryNotFound { path } => {
                write!(f, "Log directory '{}' does not exist", path.display())
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid log file pattern '{pattern}': {source}")
            }
            Self::InvalidReference { reference, reason } => {
                write!(f, "Invalid file reference {reference:?}: {reason}")
            }
            Self::NotFound { name } => write!(f, "Log file '{name}' does not exist"),
            Self::Unreadable { path, source } => {
                write!(f, "Cannot read '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CatalogError> for LogPeekError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogPeekError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogPeek results.
pub type Result<T> = std::result::Result<T, LogPeekError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_catalog_error_chain_preserved() {
        let err: LogPeekError = CatalogError::Unreadable {
            path: PathBuf::from("/var/log/app/log-2024-01-01.php"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(err.to_string().contains("log-2024-01-01.php"));
        let inner = err.source().expect("catalog source");
        assert!(inner.source().is_some(), "io cause should be reachable");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(CatalogError::NotFound { name: "x".into() }.is_not_found());
        assert!(!CatalogError::InvalidReference {
            reference: "%%".into(),
            reason: "not base64".into(),
        }
        .is_not_found());
    }
}
