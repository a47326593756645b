pub mod document;
mod open;
pub mod packager;
pub mod store;
pub mod worker;

pub use document::PACKAGE_FILE;
pub use packager::create_package;
pub use store::{IndexStore, StoreConfig};
pub use worker::{RefreshConfig, RefreshWorker};
