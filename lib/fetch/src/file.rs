use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FetchError;
use crate::traits::Fetcher;

/// FsFetcher serves catalog files from a local directory.
///
/// Keys are mapped to paths under `base_dir`:
///   key "vendor/acme/index.yaml" → `{base_dir}/vendor/acme/index.yaml`
///
/// Keys that would escape `base_dir` are rejected as NotFound.
pub struct FsFetcher {
    base_dir: PathBuf,
}

impl FsFetcher {
    /// Create a new FsFetcher rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a key to a filesystem path. Rejects empty, absolute and
    /// parent-traversing keys.
    fn resolve(&self, key: &str) -> Result<PathBuf, FetchError> {
        if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
            return Err(FetchError::NotFound(key.to_string()));
        }
        if Path::new(key)
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(FetchError::NotFound(key.to_string()));
        }
        Ok(self.base_dir.join(key))
    }
}

impl Fetcher for FsFetcher {
    fn file(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let resolved = self.resolve(path)?;
        match fs::read(&resolved) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.to_string()))
            }
            Err(e) => Err(FetchError::Io(format!("{}: {e}", resolved.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_nested_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("vendor/acme")).unwrap();
        fs::write(tmp.path().join("vendor/acme/index.yaml"), b"endDevices: []").unwrap();

        let f = FsFetcher::new(tmp.path());
        assert_eq!(f.file("vendor/acme/index.yaml").unwrap(), b"endDevices: []");
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let f = FsFetcher::new(tmp.path());
        assert!(matches!(f.file("nope.yaml").unwrap_err(), FetchError::NotFound(_)));
    }

    #[test]
    fn traversal_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let f = FsFetcher::new(tmp.path().join("root"));
        assert!(matches!(f.file("../secret").unwrap_err(), FetchError::NotFound(_)));
        assert!(matches!(f.file("/etc/passwd").unwrap_err(), FetchError::NotFound(_)));
    }
}
