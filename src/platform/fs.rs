// LogPeek - platform/fs.rs
//
// File content access for the view pipeline.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Open a log file and report its length from the open handle.
///
/// Read through the returned handle so content and length describe the same
/// file, even if the path is replaced afterwards.
pub fn open_log(path: &Path) -> io::Result<(File, u64)> {
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

/// Read at most `max_bytes` from `reader` as a list of lines.
///
/// Invalid UTF-8 is replaced rather than rejected. Line terminators (`\n` or
/// `\r\n`) are removed and empty lines are skipped, so a final line still
/// being written without its newline is returned as-is and completed on a
/// later read. Content past `max_bytes` (a file that grew after its size
/// was checked) is never loaded.
pub fn read_log_lines<R: Read>(reader: R, max_bytes: u64) -> io::Result<Vec<String>> {
    let mut bytes = Vec::new();
    reader.take(max_bytes).read_to_end(&mut bytes)?;
    let content = String::from_utf8_lossy(&bytes);
    Ok(content
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Make `path` absolute against the current directory.
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Cannot resolve current directory");
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn read_path(path: &Path) -> io::Result<Vec<String>> {
        let (file, len) = open_log(path)?;
        read_log_lines(file, len)
    }

    #[test]
    fn test_lines_are_split_and_blank_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log-2024-01-01.php");
        std::fs::write(&path, "first\r\n\nsecond\n\n\nthird-without-newline").unwrap();
        let lines = read_path(&path).unwrap();
        assert_eq!(lines, vec!["first", "second", "third-without-newline"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.php");
        std::fs::write(&path, b"ok\n\xff\xfe tail\n").unwrap();
        let lines = read_path(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(" tail"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = open_log(Path::new("/nonexistent/logpeek.php")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_stops_at_byte_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log-2024-01-01.php");
        std::fs::write(&path, "line one\n").unwrap();
        let (file, len) = open_log(&path).unwrap();
        assert_eq!(len, 9);

        // The file grows after its size was taken.
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"line two\nline three\n")
            .unwrap();

        let lines = read_log_lines(file, len).unwrap();
        assert_eq!(lines, vec!["line one"]);
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize(Path::new("/var/log")), PathBuf::from("/var/log"));
        assert!(absolutize(Path::new("logs")).is_absolute());
    }
}
