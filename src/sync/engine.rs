//! Best-effort reconciliation between the local card store and the remote
//! card service. Sync is advisory: a missing token or an unreachable backend
//! degrades to the local list, never to a failure the UI has to handle.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::models::Card;
use crate::remote::{
    AuthResponse, CardService, DeleteAck, RemoteCardRecord, RemoteError, SaveAck, SaveCardRequest,
};
use crate::storage::{CardStore, StorageBackend, StorageError};

/// Why a push or remote delete did not complete. Routine absence conditions
/// (no token, deleted or missing card) are variants, not panics.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("no auth token available")]
    NoToken,
    #[error("no active card")]
    NoActiveCard,
    #[error("card {0} was deleted")]
    Deleted(String),
    #[error("card {0} not found")]
    NotFound(String),
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// What the remote side contributed to a [`SyncEngine::sync_now`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteStatus {
    /// Remote list fetched and merged.
    Merged { pulled: usize },
    /// No token stored; no network call was made.
    SkippedNoToken,
    /// The fetch failed; the local list was returned unchanged.
    Failed { reason: String },
}

/// Result of a sync: the authoritative local list plus the remote outcome.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub cards: Vec<Card>,
    pub status: RemoteStatus,
}

pub struct SyncEngine<'a, B: StorageBackend, S: CardService> {
    store: &'a CardStore<B>,
    service: S,
}

impl<'a, B: StorageBackend, S: CardService> SyncEngine<'a, B, S> {
    pub fn new(store: &'a CardStore<B>, service: S) -> Self {
        Self { store, service }
    }

    pub fn store(&self) -> &CardStore<B> {
        self.store
    }

    /// Pull the remote card list and merge it into the local scope. Local
    /// entries win by default; a remote record with a matching id wins over
    /// the local one; tombstoned ids are never merged back in.
    pub async fn sync_now(&self) -> Result<SyncReport, StorageError> {
        let token = match self.store.token()? {
            Some(token) => token,
            None => {
                log::debug!("sync skipped: no token");
                return Ok(SyncReport {
                    cards: self.store.list_cards()?,
                    status: RemoteStatus::SkippedNoToken,
                });
            }
        };

        let records = match self.service.list_cards(&token).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("sync: card list fetch failed: {}", e);
                return Ok(SyncReport {
                    cards: self.store.list_cards()?,
                    status: RemoteStatus::Failed {
                        reason: e.to_string(),
                    },
                });
            }
        };

        let (cards, pulled) = self.merge_remote(records)?;
        self.repair_active_pointer(&cards)?;

        log::info!(
            "sync: merged {} remote cards, {} total in scope {}",
            pulled,
            cards.len(),
            self.store.scope()?
        );
        Ok(SyncReport {
            cards,
            status: RemoteStatus::Merged { pulled },
        })
    }

    /// Deterministic merge: local list (tombstones excluded) keyed by id,
    /// remote records overwriting matching ids, result sorted by creation
    /// time descending and persisted. Ties keep local-first insertion order
    /// (stable sort).
    fn merge_remote(
        &self,
        records: Vec<RemoteCardRecord>,
    ) -> Result<(Vec<Card>, usize), StorageError> {
        let deleted = self.store.deleted_ids()?;

        let mut order: Vec<String> = Vec::new();
        let mut by_id: HashMap<String, Card> = HashMap::new();
        for card in self.store.list_cards()? {
            order.push(card.id.clone());
            by_id.insert(card.id.clone(), card);
        }

        let mut pulled = 0;
        for record in records {
            let id = record.id.trim().to_string();
            if id.is_empty() {
                continue;
            }
            if deleted.contains(&id) {
                log::debug!("sync: skipping tombstoned card {}", id);
                continue;
            }
            let card = match record.into_card() {
                Some(card) => card,
                None => continue,
            };
            if by_id.insert(id.clone(), card).is_none() {
                order.push(id);
            } else {
                log::debug!("sync: remote record overwrites local card {}", id);
            }
            pulled += 1;
        }

        let mut merged: Vec<Card> = order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        self.store.set_cards(merged.clone())?;
        Ok((merged, pulled))
    }

    /// Point the active pointer at the first merged card when it is unset,
    /// tombstoned, or no longer present in the merged list.
    fn repair_active_pointer(&self, merged: &[Card]) -> Result<(), StorageError> {
        let active = self.store.get_active_id()?;
        let valid = !active.is_empty()
            && !self.store.is_deleted(&active)?
            && merged.iter().any(|c| c.id == active);
        if !valid {
            if let Some(first) = merged.first() {
                self.store.set_active_id(&first.id)?;
            }
        }
        Ok(())
    }

    /// Push one local card to the backend save endpoint. The full normalized
    /// card travels as the `data` payload.
    pub async fn push_card_now(&self, card_id: &str) -> Result<SaveAck, PushError> {
        let token = self.store.token()?.ok_or(PushError::NoToken)?;

        let sid = card_id.trim();
        if sid.is_empty() || self.store.is_deleted(sid)? {
            return Err(PushError::Deleted(sid.to_string()));
        }

        let card = self
            .store
            .list_cards()?
            .into_iter()
            .find(|c| c.id == sid)
            .ok_or_else(|| PushError::NotFound(sid.to_string()))?;

        let request = SaveCardRequest::for_card(&card);
        Ok(self.service.save_card(&token, &request).await?)
    }

    pub async fn push_active_now(&self) -> Result<SaveAck, PushError> {
        let active = self.store.get_active_id()?;
        if active.is_empty() {
            return Err(PushError::NoActiveCard);
        }
        self.push_card_now(&active).await
    }

    /// Push with a wall-clock deadline. `Ok(None)` means the deadline
    /// expired; callers (the wizard finish flow) proceed regardless instead
    /// of blocking navigation on a slow backend.
    pub async fn push_card_with_deadline(
        &self,
        card_id: &str,
        deadline: Duration,
    ) -> Result<Option<SaveAck>, PushError> {
        match tokio::time::timeout(deadline, self.push_card_now(card_id)).await {
            Ok(result) => result.map(Some),
            Err(_) => {
                log::warn!(
                    "push of card {} abandoned after {:?}",
                    card_id,
                    deadline
                );
                Ok(None)
            }
        }
    }

    /// Delete a card on the backend: primary `DELETE /cards/{id}`, falling
    /// back to `POST /cards/delete`. The first success wins.
    pub async fn delete_card_now(&self, card_id: &str) -> Result<DeleteAck, PushError> {
        let token = self.store.token()?.ok_or(PushError::NoToken)?;

        let sid = card_id.trim();
        if sid.is_empty() {
            return Err(PushError::NotFound(String::new()));
        }

        match self.service.delete_card(&token, sid).await {
            Ok(ack) => Ok(ack),
            Err(primary) => {
                log::debug!(
                    "primary delete of {} failed ({}), trying fallback",
                    sid,
                    primary
                );
                Ok(self.service.delete_card_fallback(&token, sid).await?)
            }
        }
    }

    /// Remove a card locally and propagate the delete to the backend on a
    /// best-effort basis. The local removal is immediate and irreversible
    /// regardless of the remote outcome.
    pub async fn remove_card(&self, card_id: &str) -> Result<(), StorageError> {
        self.store.remove_card(card_id)?;

        if card_id.trim().is_empty() {
            return Ok(());
        }
        if let Err(e) = self.delete_card_now(card_id).await {
            log::debug!("remote delete of {} not confirmed: {}", card_id, e);
        }
        Ok(())
    }

    /// Fetch a publicly shared card. `Ok(None)` for unknown ids.
    pub async fn fetch_public_card(&self, card_id: &str) -> Result<Option<Card>, RemoteError> {
        match self.service.fetch_public_card(card_id).await {
            Ok(payload) => Ok(payload.into_card()),
            Err(RemoteError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Log in against the backend and adopt the returned identity: token and
    /// user are stored, and the new scope's stores are seeded.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, PushError> {
        let auth = self.service.login(email, password).await?;
        self.adopt_identity(&auth, email)?;
        Ok(auth)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, PushError> {
        let auth = self.service.register(name, email, password).await?;
        self.adopt_identity(&auth, email)?;
        Ok(auth)
    }

    fn adopt_identity(&self, auth: &AuthResponse, fallback_email: &str) -> Result<(), PushError> {
        self.store.set_token(&auth.token)?;
        self.store.set_user(&auth.user)?;
        let email = auth
            .user
            .email
            .clone()
            .unwrap_or_else(|| fallback_email.to_string());
        self.store.login(&email)?;
        Ok(())
    }
}
