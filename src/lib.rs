//! Card store and sync core for the mycard digital business card builder.
//!
//! The pieces fit together like this: UI surfaces (wizard, editor, dashboard,
//! CLI) talk to a [`CardStore`] — per-user-scoped CRUD over a pluggable
//! key-value [`StorageBackend`], with delete tombstones — while a
//! [`SyncEngine`] reconciles that local state against the remote card
//! service on a best-effort basis. Deleted cards never reappear after a
//! sync, and switching the logged-in identity switches the whole namespace.

pub mod models;
pub mod remote;
pub mod scope;
pub mod storage;
pub mod sync;

pub use models::{Card, CardStatus, WizardInput};
pub use remote::{CardService, HttpCardService, RemoteError};
pub use scope::{scope_id, User, UserId};
pub use storage::{CardStore, FileBackend, MemoryBackend, StorageBackend, StorageError};
pub use sync::{PushError, RemoteStatus, SyncEngine, SyncReport};
