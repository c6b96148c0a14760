//! Storage backends for short URL mappings.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use pinhole_core::repository::{ReadRepository, Repository};
pub use pinhole_core::StorageError;
