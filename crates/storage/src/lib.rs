#![forbid(unsafe_code)]

mod mapping;
pub mod repository;
pub mod sqlite;

pub use repository::{
    BlobRepository, InMemoryRepository, STATE_KEY, StateStore, Storage, StorageError,
};
