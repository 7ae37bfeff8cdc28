//! Snapshot files - explicit load/save of exported aggregate text
//!
//! No autosave and no durability guarantees: the runtime loads once at
//! start-up and saves once at shutdown.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read snapshot text from `path`; a missing file yields `Ok(None)`
pub fn load_snapshot(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            log::info!("Loaded snapshot from {} ({} bytes)", path.display(), text.len());
            Ok(Some(text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::info!("No existing snapshot file found: {}", path.display());
            Ok(None)
        }
        Err(source) => Err(PersistenceError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Write snapshot text to `path`, replacing any previous file
pub fn save_snapshot(path: &Path, text: &str) -> Result<(), PersistenceError> {
    fs::write(path, text).map_err(|source| PersistenceError::Io {
        path: path.display().to_string(),
        source,
    })?;

    log::debug!("Saved snapshot to {} ({} bytes)", path.display(), text.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempdir().unwrap();

        let loaded = load_snapshot(&dir.path().join("absent.tsv")).unwrap();

        assert_eq!(loaded, None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trades.tsv");

        save_snapshot(&path, "ABC\t120\nXYZ\t-40\n").unwrap();

        assert_eq!(load_snapshot(&path).unwrap().as_deref(), Some("ABC\t120\nXYZ\t-40\n"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no").join("such").join("dir.tsv");

        let err = save_snapshot(&path, "ABC\t1\n").unwrap_err();

        assert!(err.to_string().contains("dir.tsv"));
    }
}
