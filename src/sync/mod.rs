mod engine;

pub use engine::{PushError, RemoteStatus, SyncEngine, SyncReport};
