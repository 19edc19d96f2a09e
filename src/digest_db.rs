//! The persisted digest database: one `<sha1>\t<relative-path>` record per
//! line, sorted by path.
//!
//! Each tracked directory owns exactly one database file (`.sha1sums`) at
//! its root. Relative paths use forward separators. A path containing a
//! newline corrupts the line-oriented format; this is a documented
//! limitation of the format and is not defended against.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the persisted database inside a tracked directory root.
pub const DB_FILENAME: &str = ".sha1sums";

/// Hex characters in a SHA-1 digest.
const DIGEST_LEN: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Malformed record on line {line}: {content:?}")]
    Parse { line: usize, content: String },
}

/// An ordered mapping of relative path to content digest.
///
/// `BTreeMap` keeps entries sorted by path, so serialization is
/// deterministic: repeated saves of identical content are byte-identical,
/// which keeps the database itself diffable and checksummable externally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashDatabase {
    pub entries: BTreeMap<String, String>,
}

impl HashDatabase {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        HashDatabase { entries }
    }

    /// The database path for a directory root.
    pub fn location(root: &Path) -> PathBuf {
        root.join(DB_FILENAME)
    }

    /// Parse the persisted line format. Fails on the first malformed record
    /// (missing tab separator or digest that is not 40 lowercase hex chars),
    /// naming the offending line. Malformed databases are never silently
    /// repaired.
    pub fn parse(content: &str) -> Result<Self, DbError> {
        let mut entries = BTreeMap::new();

        for (index, line) in content.lines().enumerate() {
            let malformed = || DbError::Parse {
                line: index + 1,
                content: line.to_string(),
            };

            let (digest, path) = line.split_once('\t').ok_or_else(malformed)?;

            if digest.len() != DIGEST_LEN
                || !digest.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
                || path.is_empty()
            {
                return Err(malformed());
            }

            entries.insert(path.to_string(), digest.to_string());
        }

        Ok(HashDatabase { entries })
    }

    /// Serialize to the persisted line format, sorted by path.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (path, digest) in &self.entries {
            out.push_str(digest);
            out.push('\t');
            out.push_str(path);
            out.push('\n');
        }
        out
    }

    /// Load a database from the filesystem.
    pub fn load(path: &Path) -> Result<Self, DbError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                DbError::PermissionDenied(path.to_path_buf())
            } else {
                DbError::Io(e)
            }
        })?;

        Self::parse(&content)
    }

    /// Load a database, treating an absent file as "no database yet".
    pub fn try_load(path: &Path) -> Result<Option<Self>, DbError> {
        match Self::load(path) {
            Ok(db) => Ok(Some(db)),
            Err(DbError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Save the database to the filesystem atomically.
    ///
    /// Writes to a temporary file in the same directory, fsyncs it, then
    /// atomically renames it into place. A crash mid-save leaves either the
    /// old database or the new one, never a torn file.
    pub fn save(&self, path: &Path) -> Result<(), DbError> {
        use std::io::Write;

        let content = self.serialize();

        let parent = path.parent().unwrap_or(Path::new("."));

        let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                DbError::PermissionDenied(parent.to_path_buf())
            } else {
                DbError::Io(e)
            }
        })?;

        temp_file.write_all(content.as_bytes()).map_err(|e| {
            if e.kind() == ErrorKind::PermissionDenied {
                DbError::PermissionDenied(path.to_path_buf())
            } else {
                DbError::Io(e)
            }
        })?;

        temp_file.as_file().sync_all().map_err(DbError::Io)?;

        temp_file.persist(path).map_err(|e| {
            if e.error.kind() == ErrorKind::PermissionDenied {
                DbError::PermissionDenied(path.to_path_buf())
            } else {
                DbError::Io(e.error)
            }
        })?;

        Ok(())
    }
}
