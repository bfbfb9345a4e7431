use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Default theme values applied by [`Card::normalize`].
pub const DEFAULT_BASE_COLOR: &str = "#0f7f75";
pub const DEFAULT_BACKGROUND_STYLE: &str = "gradient";
pub const DEFAULT_HEADER_STYLE: &str = "left";
pub const DEFAULT_TEMPLATE: &str = "classic";

/// Publication status of a card. Only `draft` is produced today; `published`
/// is accepted from the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    #[default]
    Draft,
    Published,
}

/// Raw onboarding answers, write-once from the creation wizard.
/// Read as fallback values when the editable profile leaves a field empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardAnswers {
    pub name: String,
    pub job_title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

/// Editable profile presentation fields. Overrides `wizard` when present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicProfile {
    pub display_name: String,
    pub tagline: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub banner_image: String,
    pub profile_image: String,
}

/// Social / contact channels. Raw strings (URL or handle), empty when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CardLinks {
    pub website: String,
    pub whatsapp: String,
    pub instagram: String,
    pub facebook: String,
    pub telegram: String,
}

/// Visual theme. Empty fields are filled with defaults during normalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CardTheme {
    pub base_color: String,
    pub background_style: String,
    pub header_style: String,
    pub template: String,
}

/// Email signature block used by the signature page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailSignature {
    pub text: String,
    pub image: String,
}

/// A virtual business card. The JSON shape (camelCase) is shared between
/// local persistence and the backend `data` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Card {
    pub id: String,
    pub status: CardStatus,
    /// Epoch milliseconds, set once at creation and never updated.
    pub created_at: i64,
    pub wizard: WizardAnswers,
    pub basic: BasicProfile,
    pub links: CardLinks,
    pub theme: CardTheme,
    /// Ordered free-text offerings. Insertion order significant, duplicates allowed.
    pub services: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_signature: Option<EmailSignature>,
}

/// Fields collected by the creation wizard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardInput {
    pub name: String,
    pub job_title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub location: String,
}

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a fresh local card id: `c_<random hex>_<millis hex>`.
pub fn new_card_id() -> String {
    let random_part: u64 = rand::random();
    format!("c_{:x}_{:x}", random_part, now_millis())
}

impl Card {
    /// Fill every missing field with its documented default so callers always
    /// see a fully-shaped card. Idempotent: normalizing twice changes nothing.
    pub fn normalize(&mut self) {
        let trimmed = self.id.trim();
        if trimmed.is_empty() {
            self.id = new_card_id();
        } else if trimmed.len() != self.id.len() {
            self.id = trimmed.to_string();
        }

        if self.created_at == 0 {
            self.created_at = now_millis();
        }

        if self.theme.base_color.is_empty() {
            self.theme.base_color = DEFAULT_BASE_COLOR.to_string();
        }
        if self.theme.background_style.is_empty() {
            self.theme.background_style = DEFAULT_BACKGROUND_STYLE.to_string();
        }
        if self.theme.header_style.is_empty() {
            self.theme.header_style = DEFAULT_HEADER_STYLE.to_string();
        }
        if self.theme.template.is_empty() {
            self.theme.template = DEFAULT_TEMPLATE.to_string();
        }
    }

    /// Consuming variant of [`Card::normalize`].
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Build a new draft from wizard answers. The answers are trimmed and
    /// mirrored into the editable profile as starting values.
    pub fn from_wizard(input: &WizardInput) -> Self {
        let wizard = WizardAnswers {
            name: input.name.trim().to_string(),
            job_title: input.job_title.trim().to_string(),
            company: input.company.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            location: input.location.trim().to_string(),
        };

        let basic = BasicProfile {
            display_name: wizard.name.clone(),
            tagline: wizard.job_title.clone(),
            company: wizard.company.clone(),
            email: wizard.email.clone(),
            phone: wizard.phone.clone(),
            location: wizard.location.clone(),
            banner_image: String::new(),
            profile_image: String::new(),
        };

        Card {
            id: new_card_id(),
            status: CardStatus::Draft,
            created_at: now_millis(),
            wizard,
            basic,
            ..Card::default()
        }
        .normalized()
    }

    /// Display title: profile name, falling back to the wizard name, then a
    /// fixed placeholder. Used for the backend save payload.
    pub fn title(&self) -> String {
        if !self.basic.display_name.is_empty() {
            self.basic.display_name.clone()
        } else if !self.wizard.name.is_empty() {
            self.wizard.name.clone()
        } else {
            "MYCARD".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fills_defaults() {
        let card = Card::default().normalized();

        assert!(card.id.starts_with("c_"));
        assert_eq!(card.status, CardStatus::Draft);
        assert!(card.created_at > 0);
        assert_eq!(card.theme.base_color, DEFAULT_BASE_COLOR);
        assert_eq!(card.theme.background_style, DEFAULT_BACKGROUND_STYLE);
        assert_eq!(card.theme.header_style, DEFAULT_HEADER_STYLE);
        assert_eq!(card.theme.template, DEFAULT_TEMPLATE);
        assert!(card.services.is_empty());
        assert!(card.description.is_empty());
        assert!(card.email_signature.is_none());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = Card::default().normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);

        let mut partial = Card {
            id: "  c_keep  ".to_string(),
            created_at: 42,
            ..Card::default()
        };
        partial.theme.base_color = "#123456".to_string();
        let once = partial.normalized();
        assert_eq!(once.id, "c_keep");
        assert_eq!(once.created_at, 42);
        assert_eq!(once.theme.base_color, "#123456");
        assert_eq!(once.clone().normalized(), once);
    }

    #[test]
    fn test_normalize_from_partial_json() {
        let card: Card =
            serde_json::from_str(r#"{"basic":{"displayName":"Ada"}}"#).unwrap();
        let card = card.normalized();

        assert_eq!(card.basic.display_name, "Ada");
        assert_eq!(card.theme.base_color, DEFAULT_BASE_COLOR);
        assert!(!card.id.is_empty());
    }

    #[test]
    fn test_card_ids_are_unique() {
        let a = new_card_id();
        let b = new_card_id();
        assert_ne!(a, b);
        assert!(a.starts_with("c_"));
    }

    #[test]
    fn test_from_wizard_trims_and_mirrors() {
        let input = WizardInput {
            name: "  Ada Lovelace ".to_string(),
            job_title: "Engineer".to_string(),
            company: " Analytical ".to_string(),
            email: "ada@example.com".to_string(),
            phone: "12345678".to_string(),
            location: "London".to_string(),
        };

        let card = Card::from_wizard(&input);
        assert_eq!(card.wizard.name, "Ada Lovelace");
        assert_eq!(card.basic.display_name, "Ada Lovelace");
        assert_eq!(card.basic.tagline, "Engineer");
        assert_eq!(card.basic.company, "Analytical");
        assert_eq!(card.status, CardStatus::Draft);
        assert!(card.created_at > 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let card = Card::default().normalized();
        let json = serde_json::to_string(&card).unwrap();

        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"baseColor\""));
        assert!(json.contains("\"displayName\""));
        // Optional signature is omitted entirely when unset
        assert!(!json.contains("emailSignature"));
    }

    #[test]
    fn test_title_fallback_chain() {
        let mut card = Card::default();
        assert_eq!(card.title(), "MYCARD");
        card.wizard.name = "Wizard Name".to_string();
        assert_eq!(card.title(), "Wizard Name");
        card.basic.display_name = "Display Name".to_string();
        assert_eq!(card.title(), "Display Name");
    }
}
