use crate::error::FetchError;

/// Fetcher retrieves raw catalog bytes by path.
///
/// Paths are forward-slash relative keys: `vendor/index.yaml`,
/// `vendor/acme/device.yaml`, `package.zip`. The default implementations
/// are [`crate::MemFetcher`] (tests, static catalogs) and
/// [`crate::FsFetcher`] (a catalog checkout or an unpacked package). HTTP
/// and object-storage backends live outside this workspace and plug in by
/// implementing this trait.
pub trait Fetcher: Send + Sync {
    /// Fetch the file at `path`. Fails with [`FetchError::NotFound`] if the
    /// file does not exist.
    fn file(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}
