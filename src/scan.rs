//! Recursive directory scanning producing a point-in-time snapshot of
//! relative path -> content digest.
//!
//! Snapshots are ephemeral: they exist only for the duration of one workflow
//! invocation and are never persisted directly. Symlinks and other
//! non-regular files are skipped (never followed); keeping that policy fixed
//! means successive snapshots differ only when file content actually drifts.

use crate::digest::{DigestError, digest_file};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),
}

/// A point-in-time mapping of relative path (forward separators) to digest.
pub type DirectorySnapshot = BTreeMap<String, String>;

/// Returns the standard exclusion predicate for a tracked directory: skip
/// exactly the database file name, at any depth.
///
/// Exclusion is an explicit parameter of [`scan_directory`] rather than a
/// rule buried in the walk, so tests and callers can see and vary it.
pub fn exclude_database(name: &str) -> bool {
    name == crate::digest_db::DB_FILENAME
}

/// Walks the tree under `root` and digests every regular file, producing a
/// [`DirectorySnapshot`].
///
/// `exclude` is consulted with each entry's file name; matching entries are
/// skipped entirely (for directories, including their contents). Entries are
/// visited in sorted order so traversal is deterministic. Any IO or digest
/// failure aborts the whole scan: a snapshot with silently missing files
/// must never reach the reconciler.
pub fn scan_directory(
    root: &Path,
    exclude: &dyn Fn(&str) -> bool,
) -> Result<DirectorySnapshot, ScanError> {
    let mut snapshot = BTreeMap::new();
    walk(root, String::new(), exclude, &mut snapshot)?;

    info!("Scanned {} files under {}", snapshot.len(), root.display());

    Ok(snapshot)
}

fn walk(
    dir: &Path,
    prefix: String,
    exclude: &dyn Fn(&str) -> bool,
    snapshot: &mut DirectorySnapshot,
) -> Result<(), ScanError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ScanError::PermissionDenied(dir.to_path_buf())
        } else {
            ScanError::Io(e)
        }
    })?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(ScanError::Io)?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => {
                return Err(ScanError::Io(std::io::Error::other(format!(
                    "non-UTF-8 file name: {:?}",
                    name
                ))));
            }
        }
    }
    names.sort();

    for name in names {
        if exclude(&name) {
            continue;
        }

        let path = dir.join(&name);
        let relative = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };

        // symlink_metadata so symlinks are classified, not followed
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                ScanError::PermissionDenied(path.clone())
            } else {
                ScanError::Io(e)
            }
        })?;

        let file_type = metadata.file_type();

        if file_type.is_dir() {
            walk(&path, relative, exclude, snapshot)?;
        } else if file_type.is_file() {
            let digest = digest_file(&path)?;
            snapshot.insert(relative, digest);
        }
        // Symlinks and special files are skipped by policy.
    }

    Ok(())
}
