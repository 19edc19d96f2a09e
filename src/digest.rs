use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
}

/// Computes the SHA-1 digest of a file's content, streamed in fixed-size
/// chunks so arbitrarily large files never need to fit in memory.
///
/// The digest is a pure function of the file bytes: no metadata (mtime,
/// size, permissions) participates. Returned as 40 lowercase hex characters,
/// matching the persisted database format.
///
/// # Errors
/// - `DigestError::Io`: the file does not exist or became unreadable
///   mid-read. Callers scanning a tree must propagate this rather than skip
///   the file; a silently missing digest defeats the integrity purpose.
/// - `DigestError::PermissionDenied`: insufficient permissions.
pub fn digest_file(path: &Path) -> Result<String, DigestError> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            DigestError::PermissionDenied(path.to_path_buf())
        } else {
            DigestError::Io(e)
        }
    })?;

    let mut hasher = Sha1::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(DigestError::Io)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let digest = format!("{:x}", hasher.finalize());

    debug!("Digest of {} is {}", path.display(), digest);

    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_digest_simple_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"Hello, world!").unwrap();
        temp_file.flush().unwrap();

        let digest = digest_file(temp_file.path()).unwrap();

        assert_eq!(digest, "943a702d06f34599aee1f8da8ef9f7296031d699");
    }

    #[test]
    fn test_digest_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();

        let digest = digest_file(temp_file.path()).unwrap();

        assert_eq!(digest, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn test_digest_large_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let content = vec![b'A'; 1024 * 1024];
        temp_file.write_all(&content).unwrap();
        temp_file.flush().unwrap();

        let digest = digest_file(temp_file.path()).unwrap();

        assert_eq!(digest.len(), 40);
    }

    #[test]
    fn test_digest_nonexistent_file() {
        let result = digest_file(Path::new("/nonexistent/file.txt"));

        assert!(result.is_err());
        match result {
            Err(DigestError::Io(_)) => {}
            _ => panic!("Expected IO error for nonexistent file"),
        }
    }

    #[test]
    fn test_digest_deterministic() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"test content").unwrap();
        temp_file.flush().unwrap();

        let digest1 = digest_file(temp_file.path()).unwrap();
        let digest2 = digest_file(temp_file.path()).unwrap();

        assert_eq!(digest1, digest2);
    }

    #[test]
    #[cfg(unix)]
    fn test_digest_permission_denied() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"test content").unwrap();
        temp_file.flush().unwrap();

        let mut perms = fs::metadata(temp_file.path()).unwrap().permissions();
        perms.set_mode(0o000);
        fs::set_permissions(temp_file.path(), perms).unwrap();

        let result = digest_file(temp_file.path());

        assert!(result.is_err());
        match result {
            Err(DigestError::PermissionDenied(_)) => {}
            _ => panic!("Expected PermissionDenied error"),
        }
    }
}
