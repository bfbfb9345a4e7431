//! Wire types for the remote card service. The backend is loose about its
//! envelope shapes, so the accepted variants are spelled out as sum types
//! with a fixed fallback order instead of duck-typed probing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Card;
use crate::scope::User;

/// One record of the backend card list: `{id, title, theme, data: {...}}`.
/// `theme` here is the template name column, distinct from the card's nested
/// theme object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RemoteCardRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl RemoteCardRecord {
    /// Decode the nested `data` object into a normalized card carrying the
    /// record's id. Returns `None` for records without a usable id and for
    /// undecodable payloads — merge skips those rather than aborting.
    pub fn into_card(self) -> Option<Card> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return None;
        }

        let data = match self.data {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        let mut card: Card = match serde_json::from_value(data) {
            Ok(card) => card,
            Err(e) => {
                log::warn!("skipping remote card {}: undecodable data: {}", id, e);
                return None;
            }
        };

        card.id = id;
        card.normalize();
        Some(card)
    }
}

/// The card list endpoint may answer with a bare array, `{cards: [...]}` or
/// `{data: [...]}`. Decoding tries the variants in exactly that order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CardListPayload {
    Bare(Vec<RemoteCardRecord>),
    Keyed { cards: Vec<RemoteCardRecord> },
    Data { data: Vec<RemoteCardRecord> },
}

impl CardListPayload {
    pub fn into_records(self) -> Vec<RemoteCardRecord> {
        match self {
            CardListPayload::Bare(records) => records,
            CardListPayload::Keyed { cards } => cards,
            CardListPayload::Data { data } => data,
        }
    }
}

/// Body of `POST /cards/save`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCardRequest {
    pub id: String,
    pub title: String,
    pub theme: String,
    pub data: Card,
}

impl SaveCardRequest {
    pub fn for_card(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            title: card.title(),
            theme: card.theme.template.clone(),
            data: card.clone(),
        }
    }
}

/// Acknowledgement of a save: `{ok: true, id: "..."}`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SaveAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub id: String,
}

/// Acknowledgement of a delete: `{ok: true}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAck {
    #[serde(default)]
    pub ok: bool,
}

/// `POST /auth/login` and `POST /auth/register` both answer with a token and
/// the user descriptor the scope derives from.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: User,
}

/// Wrapped form of the public card endpoint:
/// `{id, data: {...}, theme, owner_user_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicCardRecord {
    #[serde(default)]
    pub id: String,
    pub data: Value,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub owner_user_id: Option<i64>,
}

/// `GET /card/<id>` answers with the wrapped record; a bare card object is
/// accepted as fallback.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PublicCardPayload {
    Wrapped(PublicCardRecord),
    Bare(Card),
}

impl PublicCardPayload {
    pub fn into_card(self) -> Option<Card> {
        match self {
            PublicCardPayload::Wrapped(record) => RemoteCardRecord {
                id: record.id,
                data: record.data,
                theme: record.theme,
                ..RemoteCardRecord::default()
            }
            .into_card(),
            PublicCardPayload::Bare(card) => Some(card.normalized()),
        }
    }
}
