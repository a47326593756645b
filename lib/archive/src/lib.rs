pub mod error;
pub mod zip;

pub use error::ArchiveError;
pub use zip::{archive, unarchive};
