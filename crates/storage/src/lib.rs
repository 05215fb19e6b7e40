#![forbid(unsafe_code)]

pub mod json_file;
pub mod keys;
pub mod repository;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use repository::{
    LocalStore, MemoryLocalStore, MemoryRemoteStore, RemoteStore, SessionRecord, StoreError,
    Stores,
};
pub use sqlite::{SqliteInitError, SqliteRemoteStore};
