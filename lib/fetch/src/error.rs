use lorahub_core::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<FetchError> for RepositoryError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(path) => RepositoryError::NotFound(format!("file not found: {path}")),
            FetchError::Io(msg) => RepositoryError::Storage(msg),
        }
    }
}
