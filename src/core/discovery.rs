// LogPeek - core/discovery.rs
//
// The log file catalog: which files exist, in what order they are shown, and
// how an opaque client reference is turned back into a path.
//
// Architecture note: listing uses `glob` over a single configured directory.
// Only metadata (size, mtime) is read here; file contents are owned by the
// app layer.
//
// Safety rules:
//   - References are base64-encoded basenames. After decoding, everything but
//     the final path component is discarded before joining onto the log
//     directory, so `../` sequences cannot escape it.
//   - A resolved name must also match the configured pattern, so unrelated
//     files that happen to live in the log directory are never served.
//   - Entries that vanish or fail metadata between listing and stat are
//     skipped (debug log), never fatal.

use crate::core::model::LogFile;
use crate::util::error::CatalogError;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// How `list_files` orders the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    /// Reverse of the glob listing (name) order. For date-stamped file names
    /// this puts the newest day first, but it is not a modification-time sort.
    #[default]
    Listing,

    /// Most recently modified first; files without an mtime go last.
    Modified,
}

/// Where log files live and which of them belong to the catalog.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Directory holding the log files.
    pub log_dir: PathBuf,

    /// Filename-only glob pattern, e.g. `log-*.php`.
    pub file_pattern: String,

    pub order: ListingOrder,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        use crate::util::constants;
        Self {
            log_dir: PathBuf::from(constants::DEFAULT_LOG_DIR),
            file_pattern: constants::DEFAULT_FILE_PATTERN.to_string(),
            order: ListingOrder::default(),
        }
    }
}

// =============================================================================
// References
// =============================================================================

/// Decoder that accepts references with or without `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Build the opaque reference for a file name.
pub fn encode_reference(name: &str) -> String {
    STANDARD.encode(name.as_bytes())
}

/// Decode a reference back into the name it was built from.
///
/// No basename reduction happens here; `FileCatalog::resolve` does that.
pub fn decode_reference(reference: &str) -> Result<String, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidReference {
        reference: reference.to_string(),
        reason,
    };

    // Unencoded `+` in a query string arrives as a space, including at
    // either end, so repair before trimming.
    let repaired = reference.replace(' ', "+");
    let trimmed = repaired.trim();
    if trimmed.is_empty() || trimmed.bytes().all(|b| b == b'+') {
        return Err(invalid("reference is empty".to_string()));
    }

    let bytes = LENIENT
        .decode(trimmed.as_bytes())
        .map_err(|e| invalid(format!("not base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| invalid(format!("not UTF-8: {e}")))
}

// =============================================================================
// Catalog
// =============================================================================

/// Lists, resolves, and deletes the log files of one directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    config: CatalogConfig,
}

impl FileCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn log_dir(&self) -> &Path {
        &self.config.log_dir
    }

    fn match_options() -> glob::MatchOptions {
        glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        }
    }

    fn name_pattern(&self) -> Result<glob::Pattern, CatalogError> {
        glob::Pattern::new(&self.config.file_pattern).map_err(|source| {
            CatalogError::InvalidPattern {
                pattern: self.config.file_pattern.clone(),
                source,
            }
        })
    }

    /// Every regular file in the log directory matching the pattern, in the
    /// configured display order. A missing directory yields an empty list.
    pub fn list_files(&self) -> Result<Vec<LogFile>, CatalogError> {
        // Validate the name pattern on its own so a bad pattern is reported as
        // such and not as a problem with the escaped directory prefix.
        self.name_pattern()?;

        let dir = self.config.log_dir.to_string_lossy();
        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(dir.trim_end_matches('/')),
            self.config.file_pattern
        );

        let paths = glob::glob_with(&full_pattern, Self::match_options()).map_err(|source| {
            CatalogError::InvalidPattern {
                pattern: full_pattern.clone(),
                source,
            }
        })?;

        let mut files: Vec<LogFile> = Vec::new();
        for entry in paths {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable catalog entry");
                    continue;
                }
            };
            match stat_regular_file(&path) {
                Ok(Some(file)) => files.push(file),
                Ok(None) => {
                    tracing::trace!(path = %path.display(), "Skipping non-regular entry");
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Entry vanished during listing");
                }
            }
        }

        match self.config.order {
            ListingOrder::Listing => files.reverse(),
            ListingOrder::Modified => {
                // Stable sort: equal mtimes keep their name order.
                files.sort_by(|a, b| b.modified.cmp(&a.modified));
            }
        }

        tracing::debug!(
            dir = %self.config.log_dir.display(),
            pattern = %self.config.file_pattern,
            order = ?self.config.order,
            files = files.len(),
            "Catalog listed"
        );

        Ok(files)
    }

    /// Resolve a client reference to a catalog file.
    pub fn resolve(&self, reference: &str) -> Result<LogFile, CatalogError> {
        let name = decode_reference(reference)?;
        self.resolve_name(&name)
    }

    /// Resolve an already-decoded file name. Only its basename is used.
    pub fn resolve_name(&self, name: &str) -> Result<LogFile, CatalogError> {
        let basename = Path::new(name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CatalogError::InvalidReference {
                reference: name.to_string(),
                reason: "does not name a file".to_string(),
            })?;

        if !self
            .name_pattern()?
            .matches_with(&basename, Self::match_options())
        {
            tracing::debug!(name = %basename, "Rejected name outside the catalog pattern");
            return Err(CatalogError::NotFound { name: basename });
        }

        let path = self.config.log_dir.join(&basename);
        match stat_regular_file(&path) {
            Ok(Some(file)) => Ok(file),
            Ok(None) => Err(CatalogError::NotFound { name: basename }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(CatalogError::NotFound { name: basename })
            }
            Err(source) => Err(CatalogError::Unreadable { path, source }),
        }
    }

    /// Delete the file named by `reference`.
    pub fn delete(&self, reference: &str) -> Result<LogFile, CatalogError> {
        let file = self.resolve(reference)?;
        remove(&file)?;
        tracing::info!(file = %file.display_name, "Log file deleted");
        Ok(file)
    }

    /// Delete every file in the catalog. Returns how many were removed.
    ///
    /// Individual failures are logged and skipped.
    pub fn delete_all(&self) -> Result<usize, CatalogError> {
        if !self.config.log_dir.is_dir() {
            return Err(CatalogError::DirectoryNotFound {
                path: self.config.log_dir.clone(),
            });
        }

        let mut removed = 0usize;
        for file in self.list_files()? {
            match remove(&file) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(error = %e, "Could not delete log file"),
            }
        }

        tracing::info!(removed, dir = %self.config.log_dir.display(), "All log files deleted");
        Ok(removed)
    }
}

/// Stat `path`, returning `None` for anything that is not a regular file.
fn stat_regular_file(path: &Path) -> io::Result<Option<LogFile>> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Ok(None);
    }
    let display_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Some(LogFile {
        path: path.to_path_buf(),
        display_name,
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        size_bytes: metadata.len(),
    }))
}

fn remove(file: &LogFile) -> Result<(), CatalogError> {
    std::fs::remove_file(&file.path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            CatalogError::NotFound {
                name: file.display_name.clone(),
            }
        } else {
            CatalogError::Unreadable {
                path: file.path.clone(),
                source,
            }
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
