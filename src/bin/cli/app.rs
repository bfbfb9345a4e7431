use std::path::Path;

use anyhow::Result;

use mycard_lib::{CardStore, FileBackend, HttpCardService, SyncEngine};

/// Shared CLI context: a file-backed card store plus an engine factory.
pub struct App {
    pub store: CardStore<FileBackend>,
}

impl App {
    pub fn new(data_dir: Option<&Path>) -> Result<Self> {
        let dir = match data_dir {
            Some(dir) => dir.to_path_buf(),
            None => FileBackend::default_data_dir()?,
        };
        let backend = FileBackend::new(dir);
        backend.init()?;
        Ok(Self {
            store: CardStore::new(backend),
        })
    }

    /// Sync engine bound to the configured backend base URL.
    pub fn engine(&self) -> Result<SyncEngine<'_, FileBackend, HttpCardService>> {
        let base = self.store.api_base()?;
        Ok(SyncEngine::new(&self.store, HttpCardService::new(base)?))
    }
}
