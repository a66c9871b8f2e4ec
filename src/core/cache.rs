use std::path::{Path, PathBuf};

/// Name of the file holding the last installed ETag inside a destination
/// directory.
pub const ETAG_FILENAME: &str = ".brave_deps_etag";

pub fn etag_path(output_dir: &Path) -> PathBuf {
    output_dir.join(ETAG_FILENAME)
}

/// Returns the stored ETag for `output_dir`. A missing or unreadable record
/// reads as `None`.
pub fn read_etag(output_dir: &Path) -> Option<String> {
    let path = etag_path(output_dir);
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(&path) {
        Ok(etag) => Some(etag),
        Err(e) => {
            tracing::warn!("Failed to read etag from {}: {e}", output_dir.display());
            None
        }
    }
}

/// Stores `etag` for `output_dir`. Failure only costs a re-download next time,
/// so it is logged and dropped.
pub fn write_etag(output_dir: &Path, etag: &str) {
    if let Err(e) = std::fs::write(etag_path(output_dir), etag) {
        tracing::warn!("Failed to write etag to {}: {e}", output_dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_record_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_etag(dir.path()), None);
        assert_eq!(read_etag(&dir.path().join("does-not-exist")), None);
    }

    #[test]
    fn test_round_trip_is_exact() {
        let dir = TempDir::new().unwrap();
        write_etag(dir.path(), "\"abc123\"");
        assert_eq!(read_etag(dir.path()).as_deref(), Some("\"abc123\""));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(ETAG_FILENAME)).unwrap(),
            "\"abc123\""
        );
    }

    #[test]
    fn test_overwrite_replaces_previous_token() {
        let dir = TempDir::new().unwrap();
        write_etag(dir.path(), "first-and-longer");
        write_etag(dir.path(), "second");
        assert_eq!(read_etag(dir.path()).as_deref(), Some("second"));
    }

    #[test]
    fn test_unreadable_record_reads_as_none() {
        let dir = TempDir::new().unwrap();
        // A directory in place of the file makes the read fail.
        std::fs::create_dir(dir.path().join(ETAG_FILENAME)).unwrap();
        assert_eq!(read_etag(dir.path()), None);
    }

    #[test]
    fn test_write_into_missing_dir_is_ignored() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        write_etag(&missing, "abc");
        assert!(!missing.exists());
    }
}
