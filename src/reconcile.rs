//! Pure reconciliation of a persisted digest database against a live
//! directory snapshot.

use crate::digest_db::HashDatabase;
use crate::scan::DirectorySnapshot;
use std::collections::BTreeMap;

/// Old and new digest of a path whose content changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedDigests {
    pub old: String,
    pub new: String,
}

/// The classified outcome of reconciliation.
///
/// The three maps are disjoint by construction: a path present in both
/// database and snapshot with a differing digest lands in `modified`, never
/// as a removed+added pair. Paths present in both with equal digests are
/// unchanged and appear nowhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// In snapshot, not in database. Path -> new digest.
    pub added: BTreeMap<String, String>,
    /// In both, digests differ.
    pub modified: BTreeMap<String, ModifiedDigests>,
    /// In database, not in snapshot. Path -> last recorded digest.
    pub removed: BTreeMap<String, String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// Diffs `database` against `snapshot`. Deterministic and side-effect free.
///
/// Equality is by digest value alone: the model carries no timestamps or
/// sizes, so only actual content drift is reported.
pub fn reconcile(database: &HashDatabase, snapshot: &DirectorySnapshot) -> ChangeSet {
    let mut changes = ChangeSet::default();

    for (path, new_digest) in snapshot {
        match database.entries.get(path) {
            None => {
                changes.added.insert(path.clone(), new_digest.clone());
            }
            Some(old_digest) if old_digest != new_digest => {
                changes.modified.insert(
                    path.clone(),
                    ModifiedDigests {
                        old: old_digest.clone(),
                        new: new_digest.clone(),
                    },
                );
            }
            Some(_) => {}
        }
    }

    for (path, old_digest) in &database.entries {
        if !snapshot.contains_key(path) {
            changes.removed.insert(path.clone(), old_digest.clone());
        }
    }

    changes
}

/// Applies a confirmed ChangeSet to a database: inserts added entries,
/// overwrites modified entries' digests, drops removed entries.
///
/// After applying, the database matches the snapshot the ChangeSet was
/// computed from.
pub fn apply_changes(database: &mut HashDatabase, changes: &ChangeSet) {
    for (path, digest) in &changes.added {
        database.entries.insert(path.clone(), digest.clone());
    }
    for (path, digests) in &changes.modified {
        database.entries.insert(path.clone(), digests.new.clone());
    }
    for path in changes.removed.keys() {
        database.entries.remove(path);
    }
}
