//! The card repository: user-scoped CRUD over a key-value backend, with
//! delete tombstones so removed cards never reappear after a backend sync.
//!
//! Scope is re-resolved from the stored user on every call, so changing the
//! logged-in identity immediately switches the namespace.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::backend::{Result, StorageBackend};
use crate::models::{now_millis, Card, WizardInput};
use crate::scope::{ScopeKeys, User, API_BASE_KEY, TOKEN_KEY, USER_KEY};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000";

/// Scoped login marker written by [`CardStore::login`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarker {
    pub email: String,
    /// Epoch milliseconds of the login.
    pub at: i64,
}

pub struct CardStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> CardStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn keys(&self) -> Result<ScopeKeys> {
        Ok(ScopeKeys::for_user(&self.user()?))
    }

    /// The active scope token (`uid_*`, `em_*` or `guest`).
    pub fn scope(&self) -> Result<String> {
        Ok(crate::scope::scope_id(&self.user()?))
    }

    // ===== Session & globals =====

    /// The stored user descriptor. Unparseable state degrades to the guest
    /// descriptor rather than failing reads.
    pub fn user(&self) -> Result<User> {
        let raw = self.backend.get(USER_KEY)?;
        Ok(raw
            .as_deref()
            .and_then(|s| match serde_json::from_str(s) {
                Ok(user) => Some(user),
                Err(e) => {
                    log::warn!("stored user is unparseable, treating as guest: {}", e);
                    None
                }
            })
            .unwrap_or_default())
    }

    pub fn set_user(&self, user: &User) -> Result<()> {
        self.backend.set(USER_KEY, &serde_json::to_string(user)?)
    }

    /// The stored bearer token, sanitized: trimmed, with a leading `Bearer `
    /// prefix stripped; the literals `null`/`undefined` count as absent.
    pub fn token(&self) -> Result<Option<String>> {
        let raw = match self.backend.get(TOKEN_KEY)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
            return Ok(None);
        }

        let token = match trimmed.get(..7) {
            Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim_start(),
            _ => trimmed,
        };
        Ok(Some(token.to_string()))
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.backend.set(TOKEN_KEY, token)
    }

    pub fn is_logged_in(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    /// Configured backend base URL, trailing slashes trimmed.
    pub fn api_base(&self) -> Result<String> {
        let base = self
            .backend
            .get(API_BASE_KEY)?
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(base.trim().trim_end_matches('/').to_string())
    }

    pub fn set_api_base(&self, url: &str) -> Result<()> {
        self.backend.set(API_BASE_KEY, url.trim())
    }

    pub fn session(&self) -> Result<Option<SessionMarker>> {
        let keys = self.keys()?;
        let raw = match self.backend.get(&keys.session)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        Ok(serde_json::from_str(&raw).ok())
    }

    /// Record a login for the current scope and seed its stores. Expects the
    /// user descriptor to be stored beforehand (scope derives from it).
    pub fn login(&self, email: &str) -> Result<()> {
        let keys = self.keys()?;
        let marker = SessionMarker {
            email: email.to_string(),
            at: now_millis(),
        };
        self.backend
            .set(&keys.session, &serde_json::to_string(&marker)?)?;

        if self.backend.get(&keys.cards)?.is_none() {
            self.backend.set(&keys.cards, "[]")?;
        }
        if self.backend.get(&keys.active)?.is_none() {
            self.backend.set(&keys.active, "")?;
        }
        if self.backend.get(&keys.deleted)?.is_none() {
            self.backend.set(&keys.deleted, "[]")?;
        }
        Ok(())
    }

    /// Clear the login identity only. Scoped card data stays in place and
    /// becomes reachable again on the next login under the same identity.
    pub fn logout(&self) -> Result<()> {
        let keys = self.keys()?;
        self.backend.remove(&keys.session)?;
        self.backend.remove(TOKEN_KEY)?;
        self.backend.remove(USER_KEY)?;
        Ok(())
    }

    // ===== Tombstones =====

    pub fn deleted_ids(&self) -> Result<HashSet<String>> {
        let keys = self.keys()?;
        let raw = match self.backend.get(&keys.deleted)? {
            Some(raw) => raw,
            None => return Ok(HashSet::new()),
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                log::warn!("tombstone set is unparseable, treating as empty: {}", e);
                Ok(HashSet::new())
            }
        }
    }

    fn save_deleted_ids(&self, ids: &HashSet<String>) -> Result<()> {
        let keys = self.keys()?;
        let list: Vec<&String> = ids.iter().collect();
        self.backend.set(&keys.deleted, &serde_json::to_string(&list)?)
    }

    pub fn mark_deleted(&self, id: &str) -> Result<()> {
        let mut ids = self.deleted_ids()?;
        ids.insert(id.to_string());
        self.save_deleted_ids(&ids)
    }

    pub fn unmark_deleted(&self, id: &str) -> Result<()> {
        let mut ids = self.deleted_ids()?;
        if ids.remove(id) {
            self.save_deleted_ids(&ids)?;
        }
        Ok(())
    }

    pub fn is_deleted(&self, id: &str) -> Result<bool> {
        Ok(self.deleted_ids()?.contains(id))
    }

    // ===== Cards =====

    fn load_cards_raw(&self) -> Result<Vec<Card>> {
        let keys = self.keys()?;
        let raw = match self.backend.get(&keys.cards)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(cards) => Ok(cards),
            Err(e) => {
                log::warn!("card list is unparseable, treating as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn save_cards_raw(&self, cards: &[Card]) -> Result<()> {
        let keys = self.keys()?;
        self.backend.set(&keys.cards, &serde_json::to_string(cards)?)
    }

    /// All cards in the current scope, normalized, tombstoned ids excluded.
    /// Order is as persisted (new drafts go to the front; sync re-sorts).
    pub fn list_cards(&self) -> Result<Vec<Card>> {
        let deleted = self.deleted_ids()?;
        Ok(self
            .load_cards_raw()?
            .into_iter()
            .map(Card::normalized)
            .filter(|c| !deleted.contains(&c.id))
            .collect())
    }

    /// Replace the scope's card list. Entries are normalized and tombstoned
    /// ids dropped before persisting.
    pub fn set_cards(&self, cards: Vec<Card>) -> Result<()> {
        let deleted = self.deleted_ids()?;
        let safe: Vec<Card> = cards
            .into_iter()
            .map(Card::normalized)
            .filter(|c| !deleted.contains(&c.id))
            .collect();
        self.save_cards_raw(&safe)
    }

    pub fn get_active_id(&self) -> Result<String> {
        let keys = self.keys()?;
        Ok(self.backend.get(&keys.active)?.unwrap_or_default())
    }

    /// Set the active-card pointer. No validation that the id exists.
    pub fn set_active_id(&self, id: &str) -> Result<()> {
        let keys = self.keys()?;
        self.backend.set(&keys.active, id)
    }

    /// The card the active pointer refers to, or `None` when the pointer is
    /// unset, tombstoned, or matches nothing.
    pub fn get_active_card(&self) -> Result<Option<Card>> {
        let id = self.get_active_id()?;
        if id.is_empty() || self.is_deleted(&id)? {
            return Ok(None);
        }
        Ok(self.list_cards()?.into_iter().find(|c| c.id == id))
    }

    /// Create a draft from wizard answers: fresh id, inserted at the front,
    /// made active. Clears any tombstone for the new id (the explicit
    /// resurrection path).
    pub fn create_draft(&self, input: &WizardInput) -> Result<Card> {
        let card = Card::from_wizard(input);

        let mut cards = self.list_cards()?;
        cards.insert(0, card.clone());
        self.save_cards_raw(&cards)?;

        self.set_active_id(&card.id)?;
        self.unmark_deleted(&card.id)?;

        log::info!("created draft {} in scope {}", card.id, self.scope()?);
        Ok(card)
    }

    /// Apply a mutation to a stored card and persist the re-normalized
    /// result. Returns `None` (update rejected) when the id is blank,
    /// tombstoned, or not present; the persisted list is left untouched.
    pub fn update_card<F>(&self, id: &str, mutator: F) -> Result<Option<Card>>
    where
        F: FnOnce(&mut Card),
    {
        let sid = id.trim();
        if sid.is_empty() || self.is_deleted(sid)? {
            return Ok(None);
        }

        let mut cards = self.list_cards()?;
        let idx = match cards.iter().position(|c| c.id == sid) {
            Some(idx) => idx,
            None => return Ok(None),
        };

        let mut updated = cards[idx].clone();
        mutator(&mut updated);
        updated.normalize();

        cards[idx] = updated.clone();
        self.save_cards_raw(&cards)?;
        Ok(Some(updated))
    }

    /// Remove a card locally. The tombstone is written before the list so an
    /// interruption between the two steps can never make the card visible
    /// again. Remote propagation lives in the sync engine.
    pub fn remove_card(&self, id: &str) -> Result<()> {
        let sid = id.trim();
        if sid.is_empty() {
            return Ok(());
        }

        self.mark_deleted(sid)?;

        let cards: Vec<Card> = self
            .list_cards()?
            .into_iter()
            .filter(|c| c.id != sid)
            .collect();
        self.save_cards_raw(&cards)?;

        if self.get_active_id()? == sid {
            self.set_active_id("")?;
        }

        log::info!("removed card {} from scope {}", sid, self.scope()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_BASE_COLOR;
    use crate::scope::UserId;
    use crate::storage::backend::MemoryBackend;

    fn store() -> CardStore<MemoryBackend> {
        CardStore::new(MemoryBackend::new())
    }

    fn store_for_uid(id: i64) -> CardStore<MemoryBackend> {
        let store = store();
        store
            .set_user(&User {
                id: Some(UserId::Number(id)),
                ..User::default()
            })
            .unwrap();
        store
    }

    fn wizard(name: &str) -> WizardInput {
        WizardInput {
            name: name.to_string(),
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            email: "a@b.co".to_string(),
            phone: "12345678".to_string(),
            location: "Berlin".to_string(),
        }
    }

    #[test]
    fn test_create_and_list() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();

        let cards = store.list_cards().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, card.id);
        assert_eq!(cards[0].basic.display_name, "Ada");
        assert_eq!(cards[0].theme.base_color, DEFAULT_BASE_COLOR);
        assert_eq!(store.get_active_id().unwrap(), card.id);
    }

    #[test]
    fn test_new_drafts_go_to_front() {
        let store = store_for_uid(7);
        let first = store.create_draft(&wizard("First")).unwrap();
        let second = store.create_draft(&wizard("Second")).unwrap();

        let cards = store.list_cards().unwrap();
        assert_eq!(cards[0].id, second.id);
        assert_eq!(cards[1].id, first.id);
        assert_eq!(store.get_active_id().unwrap(), second.id);
    }

    #[test]
    fn test_remove_card_tombstones_and_hides() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();

        store.remove_card(&card.id).unwrap();

        assert!(store.is_deleted(&card.id).unwrap());
        assert!(store.list_cards().unwrap().is_empty());
        assert!(store.get_active_card().unwrap().is_none());
        assert_eq!(store.get_active_id().unwrap(), "");
    }

    #[test]
    fn test_remove_blank_id_is_noop() {
        let store = store_for_uid(7);
        store.create_draft(&wizard("Ada")).unwrap();
        store.remove_card("  ").unwrap();
        assert_eq!(store.list_cards().unwrap().len(), 1);
    }

    #[test]
    fn test_tombstoned_card_never_listed_even_if_persisted() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();

        // Tombstone without removing the entry: reads must still exclude it
        store.mark_deleted(&card.id).unwrap();
        assert!(store.list_cards().unwrap().is_empty());
        assert!(store.get_active_card().unwrap().is_none());
    }

    #[test]
    fn test_set_cards_filters_tombstoned() {
        let store = store_for_uid(7);
        store.mark_deleted("dead").unwrap();

        let dead = Card {
            id: "dead".to_string(),
            ..Card::default()
        };
        let alive = Card {
            id: "alive".to_string(),
            ..Card::default()
        };
        store.set_cards(vec![dead, alive]).unwrap();

        let cards = store.list_cards().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].id, "alive");
    }

    #[test]
    fn test_update_card_missing_returns_none() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();

        let before = store.list_cards().unwrap();
        let result = store
            .update_card("missing", |c| c.description = "nope".to_string())
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.list_cards().unwrap(), before);

        // Blank and tombstoned ids are rejected the same way
        assert!(store.update_card("", |_| {}).unwrap().is_none());
        store.remove_card(&card.id).unwrap();
        assert!(store.update_card(&card.id, |_| {}).unwrap().is_none());
    }

    #[test]
    fn test_update_card_persists_normalized_result() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();

        let updated = store
            .update_card(&card.id, |c| {
                c.description = "Consulting".to_string();
                c.services.push("Audits".to_string());
                c.theme.base_color.clear();
            })
            .unwrap()
            .unwrap();

        assert_eq!(updated.description, "Consulting");
        assert_eq!(updated.services, vec!["Audits".to_string()]);
        // Cleared theme field re-filled by normalization
        assert_eq!(updated.theme.base_color, DEFAULT_BASE_COLOR);

        let listed = store.list_cards().unwrap();
        assert_eq!(listed[0], updated);
    }

    #[test]
    fn test_create_draft_clears_tombstone_for_its_id() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();
        store.remove_card(&card.id).unwrap();
        assert!(store.is_deleted(&card.id).unwrap());

        // A new draft always gets a fresh id, and that id must not be
        // considered deleted afterwards
        let recreated = store.create_draft(&wizard("Ada")).unwrap();
        assert_ne!(recreated.id, card.id);
        assert!(!store.is_deleted(&recreated.id).unwrap());
    }

    #[test]
    fn test_unmark_deleted_restores_visibility() {
        let store = store_for_uid(7);
        let card = store.create_draft(&wizard("Ada")).unwrap();

        store.mark_deleted(&card.id).unwrap();
        assert!(store.list_cards().unwrap().is_empty());

        store.unmark_deleted(&card.id).unwrap();
        assert!(!store.is_deleted(&card.id).unwrap());
        assert_eq!(store.list_cards().unwrap().len(), 1);
    }

    #[test]
    fn test_scope_switch_hides_other_users_cards() {
        let store = store_for_uid(7);
        store.create_draft(&wizard("Ada")).unwrap();
        assert_eq!(store.list_cards().unwrap().len(), 1);

        store
            .set_user(&User {
                id: Some(UserId::Number(9)),
                ..User::default()
            })
            .unwrap();
        assert!(store.list_cards().unwrap().is_empty());
        assert_eq!(store.get_active_id().unwrap(), "");

        // Switching back restores the original scope untouched
        store
            .set_user(&User {
                id: Some(UserId::Number(7)),
                ..User::default()
            })
            .unwrap();
        assert_eq!(store.list_cards().unwrap().len(), 1);
    }

    #[test]
    fn test_active_pointer_is_unvalidated() {
        let store = store_for_uid(7);
        store.set_active_id("ghost").unwrap();
        assert_eq!(store.get_active_id().unwrap(), "ghost");
        assert!(store.get_active_card().unwrap().is_none());
    }

    #[test]
    fn test_token_sanitization() {
        let store = store();
        assert!(store.token().unwrap().is_none());

        store.set_token("  Bearer abc123  ").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("abc123"));

        store.set_token("null").unwrap();
        assert!(store.token().unwrap().is_none());
        store.set_token("undefined").unwrap();
        assert!(store.token().unwrap().is_none());
        store.set_token("   ").unwrap();
        assert!(store.token().unwrap().is_none());

        store.set_token("plain-token").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("plain-token"));
        assert!(store.is_logged_in().unwrap());
    }

    #[test]
    fn test_api_base_default_and_trailing_slash() {
        let store = store();
        assert_eq!(store.api_base().unwrap(), DEFAULT_API_BASE);

        store.set_api_base("https://api.example.com///").unwrap();
        assert_eq!(store.api_base().unwrap(), "https://api.example.com");
    }

    #[test]
    fn test_login_seeds_scope_and_logout_clears_identity() {
        let store = store_for_uid(7);
        store.set_token("tok").unwrap();
        store.login("ada@example.com").unwrap();

        let session = store.session().unwrap().unwrap();
        assert_eq!(session.email, "ada@example.com");
        assert!(session.at > 0);

        store.create_draft(&wizard("Ada")).unwrap();
        store.logout().unwrap();

        assert!(store.token().unwrap().is_none());
        assert_eq!(store.scope().unwrap(), "guest");
        // Guest scope sees nothing; the uid_7 data is still on disk
        assert!(store.list_cards().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_state_degrades_to_empty() {
        let store = store_for_uid(7);
        let keys = ScopeKeys::for_scope("uid_7");
        store.backend().set(&keys.cards, "{not json").unwrap();
        store.backend().set(&keys.deleted, "oops").unwrap();

        assert!(store.list_cards().unwrap().is_empty());
        assert!(store.deleted_ids().unwrap().is_empty());
    }
}
