#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;
pub mod sqlite;

pub use catalog::{CatalogError, CatalogProvider, InMemoryCatalog, StaticCatalog};
pub use repository::{InMemoryRepository, Storage, StorageError};
