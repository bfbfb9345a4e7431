pub mod backend;
pub mod cards;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use cards::{CardStore, SessionMarker, DEFAULT_API_BASE};
