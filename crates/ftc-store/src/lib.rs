pub mod error;
pub mod file;
pub mod migrate;
pub mod store;

pub use error::StoreError;
pub use file::{FILE_EXTENSION, export_string, parse_import, read_file, write_file};
pub use migrate::SCHEMA_VERSION;
pub use store::ProjectStore;
