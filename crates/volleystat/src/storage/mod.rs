//! Storage layer for volleystat.
//!
//! Every document is a pretty-printed JSON file. Writes go to a sibling
//! `.tmp` file which is then renamed over the target, so an interrupted save
//! leaves the previous document in place.

pub mod layout;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub use layout::DataLayout;

/// Read and decode a JSON document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not decode as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_slice(&data)?;
    debug!("Loaded {}", path.display());
    Ok(value)
}

/// Read a JSON document, falling back to `T::default()`.
///
/// A missing or undecodable file is not an error for the books: it is
/// logged at WARN and the book starts empty. `what` names the document in
/// the log.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match read_json(path) {
        Ok(value) => value,
        Err(Error::FileAccess { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            warn!("No saved {} at {}, starting empty", what, path.display());
            T::default()
        }
        Err(e) => {
            warn!("Failed to load {} from {}: {}", what, path.display(), e);
            T::default()
        }
    }
}

/// Encode `value` as pretty JSON and atomically replace `path` with it.
///
/// Creates the parent directory if needed.
///
/// # Errors
///
/// Returns an error if encoding fails or the file cannot be written.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &data).map_err(|source| Error::FileAccess {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Saved {} ({} bytes)", path.display(), data.len());
    Ok(())
}

/// Create `dir` and its parents if they don't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture_logs;
    use std::collections::BTreeMap;

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let mut doc = BTreeMap::new();
        doc.insert("name".to_string(), "Falcons".to_string());

        write_json(&path, &doc).unwrap();
        let back: BTreeMap<String, String> = read_json(&path).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_write_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        write_json(&path, &vec![1, 2, 3]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'));
        assert!(!dir.path().join("list.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("doc.json");
        write_json(&path, &"hello").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<Vec<u8>>(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::FileAccess { .. }));
    }

    #[test]
    fn test_read_or_default_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let mut value = vec!["stale".to_string()];
        let logs = capture_logs(|| value = read_json_or_default(&path, "list"));

        assert!(value.is_empty());
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("No saved list"));
        assert!(!logs.contains("DEBUG"));
    }

    #[test]
    fn test_read_or_default_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let mut value = vec!["stale".to_string()];
        let logs = capture_logs(|| value = read_json_or_default(&path, "list"));
        assert!(value.is_empty());
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("Failed to load list"));
    }
}
