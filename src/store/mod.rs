//! Document persistence layer.

pub mod memory;
pub mod sqlite;
#[allow(clippy::module_inception)]
pub mod store;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{
    AdminRecord, ContactMessageRecord, DocumentStore, ProductRecord, VacancyRecord,
};
