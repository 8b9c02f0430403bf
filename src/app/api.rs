// LogPeek - app/api.rs
//
// JSON API: command dispatch and the wire shapes of every response.
// Transport-agnostic; the HTTP layer only maps `http_status()` onto the wire.

use crate::app::viewer::{PageState, PollResult, Viewer};
use crate::core::discovery::decode_reference;
use crate::core::model::{LogFile, LogRecord, ParseOutcome};
use crate::util::constants::{DELETE_ALL_REFERENCE, TOO_LARGE_MESSAGE};
use crate::util::error::CatalogError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const STATUS_OK: u16 = 200;
pub const STATUS_INVALID_PARAMETER: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL: u16 = 500;

// =============================================================================
// Wire shapes
// =============================================================================

/// One catalog entry as seen by API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_b64: String,
    pub file_name: String,
}

impl From<&LogFile> for FileEntry {
    fn from(file: &LogFile) -> Self {
        Self {
            file_b64: file.reference(),
            file_name: file.display_name.clone(),
        }
    }
}

/// `logs` field of a `view` response: the records, or a message telling the
/// client to download the file instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ViewLogs {
    Records(Vec<LogRecord>),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub message: String,
    pub code: u16,
}

/// Envelope for every `api=` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_files: Option<Vec<FileEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<ViewLogs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self {
            status: true,
            log_files: None,
            logs: None,
            message: None,
            error: None,
        }
    }

    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: false,
            log_files: None,
            logs: None,
            message: None,
            error: Some(ApiError {
                message: message.into(),
                code,
            }),
        }
    }

    pub fn from_catalog_error(err: &CatalogError) -> Self {
        let code = status_for(err);
        let message = match err {
            CatalogError::NotFound { .. } | CatalogError::DirectoryNotFound { .. } => {
                "File does not exist".to_string()
            }
            other => other.to_string(),
        };
        Self::failure(code, message)
    }

    /// HTTP status matching this response: `error.code` on failure, 200
    /// otherwise.
    pub fn http_status(&self) -> u16 {
        self.error.as_ref().map_or(STATUS_OK, |e| e.code)
    }
}

/// Response of the polling endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub is_modified: bool,
    /// `null` when unchanged or when the file is too large.
    pub logs: Option<Vec<LogRecord>>,
    pub last_modified_time: i64,
}

impl From<PollResult> for PollResponse {
    fn from(result: PollResult) -> Self {
        Self {
            is_modified: result.freshness.is_stale(),
            logs: result.outcome.and_then(records_or_null),
            last_modified_time: result.freshness.latest(),
        }
    }
}

/// Page state for the entry point when no other selector applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub files: Vec<FileEntry>,
    pub current_file: Option<String>,
    pub logs: Option<Vec<LogRecord>>,
    pub last_modified_time: i64,
    pub auto_refresh: bool,
}

impl PageResponse {
    pub fn new(state: PageState, auto_refresh: bool) -> Self {
        Self {
            files: state.files.iter().map(FileEntry::from).collect(),
            current_file: state.current.map(|f| f.display_name),
            logs: records_or_null(state.outcome),
            last_modified_time: state.latest_modified,
            auto_refresh,
        }
    }
}

/// Records as a list, `NoFile` as an empty list, `TooLarge` as `null`.
fn records_or_null(outcome: ParseOutcome) -> Option<Vec<LogRecord>> {
    match outcome {
        ParseOutcome::Records(records) => Some(records),
        ParseOutcome::NoFile => Some(Vec::new()),
        ParseOutcome::TooLarge => None,
    }
}

pub fn status_for(err: &CatalogError) -> u16 {
    match err {
        CatalogError::InvalidReference { .. } => STATUS_INVALID_PARAMETER,
        CatalogError::NotFound { .. }
        | CatalogError::Unreadable { .. }
        | CatalogError::DirectoryNotFound { .. } => STATUS_NOT_FOUND,
        CatalogError::InvalidPattern { .. } => STATUS_INTERNAL,
    }
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    List,
    View,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCommand(pub String);

impl fmt::Display for UnsupportedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unsupported Query Command [{}]", self.0)
    }
}

impl std::error::Error for UnsupportedCommand {}

impl FromStr for ApiCommand {
    type Err = UnsupportedCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "list" => Ok(Self::List),
            "view" => Ok(Self::View),
            "delete" => Ok(Self::Delete),
            other => Err(UnsupportedCommand(other.to_string())),
        }
    }
}

/// Run one API command. Never fails: errors are folded into the response.
pub fn dispatch(viewer: &Viewer, command: &str, file: Option<&str>) -> ApiResponse {
    let command = match command.parse::<ApiCommand>() {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected API command");
            return ApiResponse::failure(STATUS_INVALID_PARAMETER, e.to_string());
        }
    };

    let file = file.map(str::trim).filter(|f| !f.is_empty());
    let response = match command {
        ApiCommand::List => list(viewer),
        ApiCommand::View => view(viewer, file),
        ApiCommand::Delete => delete(viewer, file),
    };

    tracing::debug!(?command, status = response.http_status(), "API command handled");
    response
}

fn list(viewer: &Viewer) -> ApiResponse {
    match viewer.catalog().list_files() {
        Ok(files) => ApiResponse {
            log_files: Some(files.iter().map(FileEntry::from).collect()),
            ..ApiResponse::ok()
        },
        Err(e) => ApiResponse::from_catalog_error(&e),
    }
}

fn view(viewer: &Viewer, file: Option<&str>) -> ApiResponse {
    let Some(reference) = file else {
        return ApiResponse::failure(STATUS_INVALID_PARAMETER, "Invalid File Name Supplied");
    };

    // The reply carries the catalog alongside the records.
    let outcome = viewer.catalog().list_files().and_then(|files| {
        let file = viewer.catalog().resolve(reference)?;
        Ok((files, viewer.parse_file(&file)?))
    });

    match outcome {
        Ok((files, outcome)) => {
            let logs = match outcome {
                ParseOutcome::TooLarge => ViewLogs::Message(TOO_LARGE_MESSAGE.to_string()),
                ParseOutcome::Records(records) => ViewLogs::Records(records),
                ParseOutcome::NoFile => ViewLogs::Records(Vec::new()),
            };
            ApiResponse {
                log_files: Some(files.iter().map(FileEntry::from).collect()),
                logs: Some(logs),
                ..ApiResponse::ok()
            }
        }
        Err(e) => ApiResponse::from_catalog_error(&e),
    }
}

fn delete(viewer: &Viewer, file: Option<&str>) -> ApiResponse {
    let Some(reference) = file else {
        return ApiResponse::failure(
            STATUS_INVALID_PARAMETER,
            "NULL value is not allowed for file param",
        );
    };

    if reference == DELETE_ALL_REFERENCE {
        return match viewer.catalog().delete_all() {
            Ok(removed) => ApiResponse {
                message: Some(format!("All Files deleted ({removed})")),
                ..ApiResponse::ok()
            },
            Err(e) => ApiResponse::from_catalog_error(&e),
        };
    }

    match viewer.catalog().delete(reference) {
        Ok(file) => ApiResponse {
            message: Some(format!("File [{}] deleted", file.display_name)),
            ..ApiResponse::ok()
        },
        Err(e) => ApiResponse::from_catalog_error(&e),
    }
}

/// Whether a `del=` page selector asks for every file. The page selector
/// carries the reserved word encoded like any other reference.
pub fn is_delete_all_reference(reference: &str) -> bool {
    reference == DELETE_ALL_REFERENCE
        || decode_reference(reference).is_ok_and(|name| name == DELETE_ALL_REFERENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::change::Freshness;
    use crate::core::discovery::{encode_reference, CatalogConfig, FileCatalog};
    use crate::core::model::LogLevel;
    use crate::core::parser::ParseConfig;
    use crate::core::size_guard::SizeGuard;
    use std::path::Path;

    fn viewer(dir: &Path, max_size: u64) -> Viewer {
        Viewer::new(
            FileCatalog::new(CatalogConfig {
                log_dir: dir.to_path_buf(),
                ..CatalogConfig::default()
            }),
            SizeGuard::new(max_size),
            ParseConfig::default(),
        )
    }

    fn seeded() -> (tempfile::TempDir, Viewer) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("log-2024-01-01.php"),
            "ERROR - 2024-01-01 10:00:00 --> boom\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("log-2024-01-02.php"), "INFO - 2024-01-01 10:00:00 --> ok\n").unwrap();
        let v = viewer(dir.path(), 1024);
        (dir, v)
    }

    #[test]
    fn test_list_command() {
        let (_dir, viewer) = seeded();
        let response = dispatch(&viewer, "list", None);
        assert_eq!(response.http_status(), 200);
        let files = response.log_files.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name, "log-2024-01-02.php");
        assert_eq!(files[0].file_b64, encode_reference("log-2024-01-02.php"));
    }

    #[test]
    fn test_view_command() {
        let (_dir, viewer) = seeded();
        let response = dispatch(&viewer, "view", Some(&encode_reference("log-2024-01-01.php")));
        assert!(response.status);
        match response.logs.unwrap() {
            ViewLogs::Records(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].level, LogLevel::Error);
                assert_eq!(records[0].timestamp, "2024-01-01 10:00:00");
            }
            other => panic!("unexpected logs: {other:?}"),
        }
        let names: Vec<String> = response
            .log_files
            .unwrap()
            .into_iter()
            .map(|f| f.file_name)
            .collect();
        assert_eq!(names, vec!["log-2024-01-02.php", "log-2024-01-01.php"]);
    }

    #[test]
    fn test_view_without_file_is_400() {
        let (_dir, viewer) = seeded();
        let response = dispatch(&viewer, "view", None);
        assert_eq!(response.http_status(), 400);
        assert_eq!(response.error.unwrap().message, "Invalid File Name Supplied");
    }

    #[test]
    fn test_view_missing_file_is_404() {
        let (_dir, viewer) = seeded();
        let response = dispatch(&viewer, "view", Some(&encode_reference("log-1999-01-01.php")));
        assert_eq!(response.http_status(), 404);
        assert!(!response.status);
    }

    #[test]
    fn test_view_too_large_returns_message() {
        let (dir, _) = seeded();
        let tiny = viewer(dir.path(), 4);
        let response = dispatch(&tiny, "view", Some(&encode_reference("log-2024-01-01.php")));
        assert_eq!(response.http_status(), 200);
        assert_eq!(
            response.logs,
            Some(ViewLogs::Message(TOO_LARGE_MESSAGE.to_string()))
        );
    }

    #[test]
    fn test_delete_command() {
        let (dir, viewer) = seeded();
        let response = dispatch(&viewer, "delete", Some(&encode_reference("log-2024-01-01.php")));
        assert_eq!(response.http_status(), 200);
        assert!(!dir.path().join("log-2024-01-01.php").exists());

        let again = dispatch(&viewer, "delete", Some(&encode_reference("log-2024-01-01.php")));
        assert_eq!(again.http_status(), 404);
    }

    #[test]
    fn test_delete_all_command() {
        let (dir, viewer) = seeded();
        std::fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        let response = dispatch(&viewer, "delete", Some("all"));
        assert!(response.status);
        assert!(dir.path().join("notes.txt").exists());
        assert!(viewer.catalog().list_files().unwrap().is_empty());
    }

    #[test]
    fn test_delete_without_file_is_400() {
        let (_dir, viewer) = seeded();
        assert_eq!(dispatch(&viewer, "delete", Some("  ")).http_status(), 400);
    }

    #[test]
    fn test_unknown_command() {
        let (_dir, viewer) = seeded();
        let response = dispatch(&viewer, "purge", None);
        assert_eq!(response.http_status(), 400);
        assert_eq!(
            response.error.unwrap().message,
            "Unsupported Query Command [purge]"
        );
    }

    #[test]
    fn test_error_response_json_shape() {
        let json = serde_json::to_value(ApiResponse::failure(404, "File does not exist")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": false,
                "error": { "message": "File does not exist", "code": 404 }
            })
        );
    }

    #[test]
    fn test_poll_response_json_shape() {
        let unchanged = PollResponse::from(PollResult {
            freshness: Freshness::Unchanged { latest: 42 },
            outcome: None,
        });
        let json = serde_json::to_value(unchanged).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "isModified": false, "logs": null, "lastModifiedTime": 42 })
        );

        let too_large = PollResponse::from(PollResult {
            freshness: Freshness::Stale { latest: 43 },
            outcome: Some(ParseOutcome::TooLarge),
        });
        assert!(too_large.is_modified);
        assert!(too_large.logs.is_none());
    }

    #[test]
    fn test_delete_all_reference_forms() {
        assert!(is_delete_all_reference("all"));
        assert!(is_delete_all_reference(&encode_reference("all")));
        assert!(!is_delete_all_reference(&encode_reference("log-2024-01-01.php")));
    }
}
