//! The interactive database update workflow: scan, reconcile, and commit
//! confirmed changes to a directory's digest database.

use crate::digest_db::{DbError, HashDatabase};
use crate::reconcile::{ChangeSet, apply_changes, reconcile};
use crate::scan::{DirectorySnapshot, ScanError, exclude_database, scan_directory};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Confirmation error: {0}")]
    Confirm(std::io::Error),
}

/// The confirmation boundary: asked exactly once per non-empty ChangeSet,
/// for the whole batch. Interactive in production, scripted in tests.
pub trait ConfirmChanges {
    fn confirm(&mut self, changes: &ChangeSet) -> std::io::Result<bool>;
}

/// Where the check workflow ended up. Every variant is a normal completion;
/// declining is not an error.
#[derive(Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No database existed; one was created from the current scan.
    Created { files: usize },
    /// Database and filesystem agree; nothing was written.
    Unchanged,
    /// Changes were confirmed and committed.
    Updated(ChangeSet),
    /// Changes were presented and declined; database left untouched.
    Declined(ChangeSet),
}

/// Runs the check workflow on `root`.
///
/// First run (no database): the database is created unconditionally from the
/// scan. Subsequent runs: the ChangeSet is computed and, when non-empty,
/// presented to `confirm`; only an affirmative answer commits the merged
/// database. The database is persisted at most once per run, after all
/// reads, so interrupting before confirmation leaves persisted state
/// untouched.
pub fn check_directory(
    root: &Path,
    confirm: &mut dyn ConfirmChanges,
) -> Result<CheckOutcome, CheckError> {
    let db_path = HashDatabase::location(root);
    let existing = HashDatabase::try_load(&db_path)?;

    let snapshot = scan_directory(root, &exclude_database)?;

    let Some(mut database) = existing else {
        let files = snapshot.len();
        HashDatabase::new(snapshot).save(&db_path)?;
        return Ok(CheckOutcome::Created { files });
    };

    let changes = reconcile(&database, &snapshot);

    if changes.is_empty() {
        return Ok(CheckOutcome::Unchanged);
    }

    if !confirm.confirm(&changes).map_err(CheckError::Confirm)? {
        return Ok(CheckOutcome::Declined(changes));
    }

    apply_changes(&mut database, &changes);
    database.save(&db_path)?;

    Ok(CheckOutcome::Updated(changes))
}

/// Outcome of verifying a directory's live content against its own digest
/// database. Used as the replication precondition gate.
pub enum SourceVerification {
    Verified(DirectorySnapshot),
    /// The directory has no database at all; nothing has ever been verified.
    NoDatabase,
    Drift(ChangeSet),
}

pub fn verify_directory(root: &Path) -> Result<SourceVerification, CheckError> {
    let db_path = HashDatabase::location(root);
    let Some(database) = HashDatabase::try_load(&db_path)? else {
        return Ok(SourceVerification::NoDatabase);
    };

    let snapshot = scan_directory(root, &exclude_database)?;
    let changes = reconcile(&database, &snapshot);

    if changes.is_empty() {
        Ok(SourceVerification::Verified(snapshot))
    } else {
        Ok(SourceVerification::Drift(changes))
    }
}
