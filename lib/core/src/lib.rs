pub mod error;

pub use error::{RepositoryError, error_code};
