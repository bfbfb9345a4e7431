//! Scope resolution: every persisted collection is namespaced by the current
//! user identity so that switching accounts never exposes another account's
//! cards. The scope token is derived deterministically from the stored user.

use std::fmt;

use serde::{Deserialize, Serialize};

// Global (unscoped) keys — session identity is shared across scopes.
pub const TOKEN_KEY: &str = "mycard_token";
pub const USER_KEY: &str = "mycard_user";
pub const API_BASE_KEY: &str = "mycard_api_base";

// Per-scope key bases.
const CARDS_BASE: &str = "mycard_cards_v1_";
const ACTIVE_BASE: &str = "mycard_active_id_v1_";
const DELETED_BASE: &str = "mycard_deleted_ids_v1_";
const SESSION_BASE: &str = "mycard_session_v1_";

/// User id as reported by the backend. Numeric today, but string ids are
/// accepted and scoped verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// User descriptor stored under [`USER_KEY`]. All fields optional; an empty
/// descriptor resolves to the guest scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Resolve the storage namespace for a user. Priority: user id, then
/// normalized email, then `guest`. Pure; id 0 is a valid id.
pub fn scope_id(user: &User) -> String {
    if let Some(id) = &user.id {
        return format!("uid_{}", id);
    }

    let email = user
        .email
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_lowercase();
    if !email.is_empty() {
        return format!("em_{}", normalize_email(&email));
    }

    "guest".to_string()
}

/// Replace every character outside `[a-z0-9@._-]` with `_`.
fn normalize_email(email: &str) -> String {
    email
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '@' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// The four storage keys belonging to one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeKeys {
    pub cards: String,
    pub active: String,
    pub deleted: String,
    pub session: String,
}

impl ScopeKeys {
    pub fn for_scope(scope: &str) -> Self {
        Self {
            cards: format!("{}{}", CARDS_BASE, scope),
            active: format!("{}{}", ACTIVE_BASE, scope),
            deleted: format!("{}{}", DELETED_BASE, scope),
            session: format!("{}{}", SESSION_BASE, scope),
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self::for_scope(&scope_id(user))
    }
}
