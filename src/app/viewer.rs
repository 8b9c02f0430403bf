// LogPeek - app/viewer.rs
//
// Request-scoped view pipeline: select a file, check its size, read it, and
// assemble records. Every call recomputes from disk; nothing is cached
// between requests.
//
// Error policy:
//   - A file that disappears between listing and reading is reported as
//     `CatalogError::NotFound`, never as a panic or a partial result.
//   - Zero-length files are returned as an empty record list without being
//     read; any size the guard rejects is never read, and a file that grows
//     after the check is read only up to the guard.

use crate::core::change::{self, Freshness};
use crate::core::discovery::FileCatalog;
use crate::core::model::{LogFile, ParseOutcome};
use crate::core::parser::{self, ParseConfig};
use crate::core::size_guard::{SizeGuard, SizeVerdict};
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::CatalogError;
use std::io;
use std::path::Path;

/// Result of a polling request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    pub freshness: Freshness,
    /// `None` when the client's view is still current and nothing was parsed.
    pub outcome: Option<ParseOutcome>,
}

/// Everything needed to render the main page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub files: Vec<LogFile>,
    /// The file being shown, if any resolved.
    pub current: Option<LogFile>,
    pub outcome: ParseOutcome,
    pub latest_modified: i64,
}

/// Immutable per-process view configuration shared by all requests.
#[derive(Debug, Clone)]
pub struct Viewer {
    catalog: FileCatalog,
    guard: SizeGuard,
    parse: ParseConfig,
}

impl Viewer {
    pub fn new(catalog: FileCatalog, guard: SizeGuard, parse: ParseConfig) -> Self {
        Self {
            catalog,
            guard,
            parse,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            FileCatalog::new(config.catalog.clone()),
            SizeGuard::new(config.max_log_size),
            config.parse.clone(),
        )
    }

    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// Size-check, read and assemble one catalog file.
    pub fn parse_file(&self, file: &LogFile) -> Result<ParseOutcome, CatalogError> {
        // Re-stat: the listing may be stale by the time the request gets here.
        // Size and content come from the same open handle.
        let (handle, size) = fs::open_log(&file.path).map_err(|e| vanished(file, e))?;

        if size == 0 {
            tracing::debug!(file = %file.display_name, "Empty log file");
            return Ok(ParseOutcome::Records(Vec::new()));
        }

        if self.guard.check(Some(size)) == SizeVerdict::TooLarge {
            tracing::info!(
                file = %file.display_name,
                size,
                limit = self.guard.max_bytes,
                "Log file too large to view inline"
            );
            return Ok(ParseOutcome::TooLarge);
        }

        let lines =
            fs::read_log_lines(handle, self.guard.max_bytes).map_err(|e| vanished(file, e))?;
        let records = parser::assemble(&lines, &self.parse);

        tracing::debug!(
            file = %file.display_name,
            lines = lines.len(),
            records = records.len(),
            "Log file parsed"
        );
        Ok(ParseOutcome::Records(records))
    }

    /// Parse the file named by `reference`, or the top of the catalog when no
    /// reference is given. Returns the selected file alongside the outcome.
    pub fn view(
        &self,
        reference: Option<&str>,
    ) -> Result<(Option<LogFile>, ParseOutcome), CatalogError> {
        let selected = match non_empty(reference) {
            Some(r) => Some(self.catalog.resolve(r)?),
            None => self.catalog.list_files()?.into_iter().next(),
        };

        match selected {
            Some(file) => {
                let outcome = self.parse_file(&file)?;
                Ok((Some(file), outcome))
            }
            None => Ok((None, ParseOutcome::NoFile)),
        }
    }

    /// Answer a polling request from a client that last saw
    /// `client_last_modified`.
    ///
    /// When the catalog changed, the selected file (or the catalog top) is
    /// parsed again. A selected file that no longer exists yields an empty
    /// record list so the client clears its view.
    pub fn poll(
        &self,
        reference: Option<&str>,
        client_last_modified: i64,
    ) -> Result<PollResult, CatalogError> {
        let files = self.catalog.list_files()?;
        let freshness = change::evaluate(client_last_modified, &files);

        if !freshness.is_stale() {
            tracing::trace!(latest = freshness.latest(), "Poll: unchanged");
            return Ok(PollResult {
                freshness,
                outcome: None,
            });
        }

        let selected = match non_empty(reference) {
            Some(r) => match self.catalog.resolve(r) {
                Ok(file) => Some(file),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            },
            None => files.into_iter().next(),
        };

        let outcome = match selected {
            Some(file) => match self.parse_file(&file) {
                Ok(outcome) => outcome,
                Err(e) if e.is_not_found() => ParseOutcome::Records(Vec::new()),
                Err(e) => return Err(e),
            },
            None => ParseOutcome::Records(Vec::new()),
        };

        tracing::debug!(
            client = client_last_modified,
            latest = freshness.latest(),
            "Poll: stale, reparsed"
        );

        Ok(PollResult {
            freshness,
            outcome: Some(outcome),
        })
    }

    /// State for the main page: the catalog, the selected file's records and
    /// the catalog's latest modification time for the client's next poll.
    ///
    /// A reference to a file that no longer exists shows an empty list.
    pub fn page(&self, reference: Option<&str>) -> Result<PageState, CatalogError> {
        let files = self.catalog.list_files()?;
        let latest_modified = change::latest_modification(&files);

        let selected = match non_empty(reference) {
            Some(r) => match self.catalog.resolve(r) {
                Ok(file) => Some(file),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(error = %e, "Selected file is gone");
                    return Ok(PageState {
                        files,
                        current: None,
                        outcome: ParseOutcome::Records(Vec::new()),
                        latest_modified,
                    });
                }
                Err(e) => return Err(e),
            },
            None => files.first().cloned(),
        };

        let (current, outcome) = match selected {
            Some(file) => match self.parse_file(&file) {
                Ok(outcome) => (Some(file), outcome),
                Err(e) if e.is_not_found() => (None, ParseOutcome::Records(Vec::new())),
                Err(e) => return Err(e),
            },
            None => (None, ParseOutcome::NoFile),
        };

        Ok(PageState {
            files,
            current,
            outcome,
            latest_modified,
        })
    }

    /// Raw bytes of a catalog file, for downloads.
    pub fn read_raw(&self, file: &LogFile) -> Result<Vec<u8>, CatalogError> {
        std::fs::read(&file.path).map_err(|e| vanished(file, e))
    }

    pub fn log_dir(&self) -> &Path {
        self.catalog.log_dir()
    }
}

fn non_empty(reference: Option<&str>) -> Option<&str> {
    reference.filter(|r| !r.trim().is_empty())
}

fn vanished(file: &LogFile, source: io::Error) -> CatalogError {
    if source.kind() == io::ErrorKind::NotFound {
        tracing::debug!(file = %file.display_name, "File vanished before read");
        CatalogError::NotFound {
            name: file.display_name.clone(),
        }
    } else {
        CatalogError::Unreadable {
            path: file.path.clone(),
            source,
        }
    }
}
