//! Verified one-way replication: copy a source tree to a destination only
//! after confirming the source matches its own digest database.

use crate::check::{CheckError, SourceVerification, verify_directory};
use crate::digest_db::{DbError, HashDatabase};
use crate::reconcile::ChangeSet;
use crate::scan::{ScanError, exclude_database, scan_directory};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ReplicateError {
    #[error("Source has no digest database; run check on it first")]
    SourceNotChecked,
    #[error("Source drift detected; refusing to replicate unverified data")]
    SourceDrift(ChangeSet),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Check error: {0}")]
    Check(#[from] CheckError),
    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct ReplicateResult {
    /// Relative paths copied to the destination, in path order.
    pub copied: Vec<String>,
    /// Destination-only paths, logged and left untouched.
    pub orphans: Vec<String>,
}

/// Replicates `source` into `destination`.
///
/// 1. Verifies the source against its own database; any drift aborts before
///    a single byte is copied.
/// 2. Scans the destination and copies every path that is missing there or
///    whose content digest differs. Each copy goes through a temporary file
///    and an atomic rename, so a crash never leaves a half-written
///    destination file.
/// 3. Destination-only paths are orphans: logged one line each, never
///    deleted. Deleting is a human decision, executed separately and
///    followed by a check run on the destination.
/// 4. The destination's own database is updated with the verified source
///    digests of the files copied in step 2 and persisted once, after all
///    copies. Orphans are neither added nor removed. When nothing was
///    copied the database is not rewritten.
///
/// Interrupting mid-copy is safe: the destination database is only written
/// after every copy succeeded, so a rerun re-detects and re-copies whatever
/// is still missing or differing.
pub fn replicate_directory(
    source: &Path,
    destination: &Path,
) -> Result<ReplicateResult, ReplicateError> {
    let source_snapshot = match verify_directory(source)? {
        SourceVerification::Verified(snapshot) => snapshot,
        SourceVerification::NoDatabase => return Err(ReplicateError::SourceNotChecked),
        SourceVerification::Drift(changes) => return Err(ReplicateError::SourceDrift(changes)),
    };
    info!(
        "Source verified: {} files match the digest database",
        source_snapshot.len()
    );

    let destination_snapshot = scan_directory(destination, &exclude_database)?;

    let mut result = ReplicateResult::default();

    for (path, source_digest) in &source_snapshot {
        if destination_snapshot.get(path) != Some(source_digest) {
            copy_file(source, destination, path)?;
            info!("Copied {}", path);
            result.copied.push(path.clone());
        }
    }

    for path in destination_snapshot.keys() {
        if !source_snapshot.contains_key(path) {
            warn!("Refusing to delete orphan file in destination: {}", path);
            result.orphans.push(path.clone());
        }
    }

    if !result.copied.is_empty() {
        let db_path = HashDatabase::location(destination);
        let mut db = HashDatabase::try_load(&db_path)?.unwrap_or_default();
        for path in &result.copied {
            if let Some(digest) = source_snapshot.get(path) {
                // Verified in step 1, so no further confirmation is needed.
                db.entries.insert(path.clone(), digest.clone());
            }
        }
        db.save(&db_path)?;
    }

    Ok(result)
}

/// Copies one file, creating destination parent directories as needed and
/// placing the content with a temp-file-then-rename so the final path is
/// never observable half-written.
fn copy_file(source: &Path, destination: &Path, relative: &str) -> Result<(), ReplicateError> {
    let from = join_relative(source, relative);
    let to = join_relative(destination, relative);

    let copy_err = |e: std::io::Error| ReplicateError::Copy {
        path: relative.to_string(),
        source: e,
    };

    let parent = to.parent().unwrap_or(destination);
    std::fs::create_dir_all(parent).map_err(copy_err)?;

    let temp_file = tempfile::NamedTempFile::new_in(parent).map_err(copy_err)?;
    std::fs::copy(&from, temp_file.path()).map_err(copy_err)?;
    temp_file.as_file().sync_all().map_err(copy_err)?;
    temp_file.persist(&to).map_err(|e| copy_err(e.error))?;

    Ok(())
}

fn join_relative(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for component in relative.split('/') {
        path.push(component);
    }
    path
}
