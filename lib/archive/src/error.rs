use lorahub_core::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("malformed archive: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err.to_string())
    }
}

impl From<ArchiveError> for RepositoryError {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Malformed(msg) => RepositoryError::Corruption(msg),
            ArchiveError::Io(msg) => RepositoryError::Storage(msg),
        }
    }
}
