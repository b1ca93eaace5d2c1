//! Roster file persistence.
//!
//! The store lives in a single structured-format file. Saving writes a
//! sibling temporary file and renames it over the old one, so a failed save
//! leaves the previous roster readable.

use crate::io::formats::json;
use crate::storage::InMemoryRoster;
use crate::storage::traits::RosterStore;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Loads a roster file. A missing file is an empty roster.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or decoded.
pub fn load_roster(path: &Path) -> Result<InMemoryRoster> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Roster file not found, starting empty");
        return Ok(InMemoryRoster::new());
    }

    let bytes = fs::read(path).map_err(|e| Error::OperationFailed {
        operation: "read_roster_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    let text = String::from_utf8(bytes).map_err(|e| Error::OperationFailed {
        operation: "decode_roster_file".to_string(),
        cause: e.to_string(),
    })?;

    let persons = json::decode(&text)?;
    tracing::debug!(path = %path.display(), persons = persons.len(), "Loaded roster");
    Ok(InMemoryRoster::from_persons(persons))
}

/// Saves a roster to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the roster cannot be encoded or written.
pub fn save_roster<S>(path: &Path, store: &S) -> Result<()>
where
    S: RosterStore + ?Sized,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_roster_dir".to_string(),
            cause: format!("{}: {e}", parent.display()),
        })?;
    }

    let text = json::encode(store.persons())?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, text).map_err(|e| Error::OperationFailed {
        operation: "write_roster_file".to_string(),
        cause: format!("{}: {e}", tmp.display()),
    })?;
    if let Err(e) = fs::rename(&tmp, path) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            tracing::warn!(
                path = %tmp.display(),
                error = %cleanup,
                "Failed to remove temporary roster file"
            );
        }
        return Err(Error::OperationFailed {
            operation: "replace_roster_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        });
    }

    tracing::debug!(path = %path.display(), persons = store.len(), "Saved roster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Person;

    #[test]
    fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load_roster(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("roster.json");
        let store = InMemoryRoster::from_persons(vec![
            Person::new("abc", "Jane").with_label("eng"),
            Person::new("abd", "John"),
        ]);

        save_roster(&path, &store).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_roster(&path).unwrap(), store);
    }

    #[test]
    fn test_failed_replace_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let store = InMemoryRoster::from_persons(vec![Person::new("abc", "Jane")]);
        let err = save_roster(&path, &store).unwrap_err();

        assert!(matches!(
            err,
            Error::OperationFailed { ref operation, .. } if operation == "replace_roster_file"
        ));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_roster(&path), Err(Error::MalformedInput(_))));
    }
}
