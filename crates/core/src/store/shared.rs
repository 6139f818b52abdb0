//! Filesystem helpers for the file store.
//!
//! Records are stored under sharded directories derived from their UUID:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/` where `u` is the 32-character lowercase hex form.
//! This prevents very large fan-out in a single directory.

use crate::{AssessmentError, AssessmentResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Returns the sharded directory for `id` under `parent_dir`.
pub(super) fn sharded_dir(parent_dir: &Path, id: Uuid) -> PathBuf {
    let canonical = id.simple().to_string();
    let s1 = &canonical[0..2];
    let s2 = &canonical[2..4];
    parent_dir.join(s1).join(s2).join(&canonical)
}

/// Lists every record directory (`<s1>/<s2>/<id>`) under `parent_dir`.
///
/// A `parent_dir` that does not exist yet holds no records. Stray files inside the tree are
/// ignored.
///
/// # Errors
/// Returns `AssessmentError::FileRead` if any directory in the tree cannot be listed.
pub(super) fn record_dirs(parent_dir: &Path) -> AssessmentResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();

    let Some(s1_dirs) = subdirs(parent_dir)? else {
        return Ok(dirs);
    };
    for s1_path in s1_dirs {
        for s2_path in subdirs(&s1_path)?.unwrap_or_default() {
            dirs.extend(subdirs(&s2_path)?.unwrap_or_default());
        }
    }

    Ok(dirs)
}

/// Child directories of `dir`, or `None` if `dir` does not exist.
fn subdirs(dir: &Path) -> AssessmentResult<Option<Vec<PathBuf>>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AssessmentError::FileRead(e)),
    };

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(AssessmentError::FileRead)?.path();
        if path.is_dir() {
            paths.push(path);
        }
    }
    Ok(Some(paths))
}

pub(super) fn write_json<T: Serialize>(path: &Path, value: &T) -> AssessmentResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(AssessmentError::Serialization)?;
    fs::write(path, bytes).map_err(AssessmentError::FileWrite)
}

pub(super) fn read_json<T: DeserializeOwned>(path: &Path) -> AssessmentResult<T> {
    let bytes = fs::read(path).map_err(AssessmentError::FileRead)?;
    serde_json::from_slice(&bytes).map_err(AssessmentError::Deserialization)
}

/// Replaces `path` with `value` by writing a sibling temporary file and renaming it over.
pub(super) fn replace_json<T: Serialize>(path: &Path, value: &T) -> AssessmentResult<()> {
    let tmp = path.with_extension("json.tmp");
    write_json(&tmp, value)?;
    fs::rename(&tmp, path).map_err(AssessmentError::FileWrite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sharded_dir_uses_first_four_hex_characters() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let dir = sharded_dir(Path::new("/data"), id);
        assert_eq!(
            dir,
            PathBuf::from("/data/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn record_dirs_finds_only_leaf_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let a = sharded_dir(temp_dir.path(), Uuid::new_v4());
        let b = sharded_dir(temp_dir.path(), Uuid::new_v4());
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(temp_dir.path().join("stray.txt"), "x").unwrap();

        let mut found = record_dirs(temp_dir.path()).unwrap();
        found.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(found, expected);

        assert!(record_dirs(&temp_dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn record_dirs_fails_when_root_is_not_a_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("records");
        fs::write(&root, "not a directory").unwrap();

        let err = record_dirs(&root).expect_err("listing a file should fail");
        assert!(matches!(err, AssessmentError::FileRead(_)));
    }
}
