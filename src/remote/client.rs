use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;

use super::payload::{
    AuthResponse, CardListPayload, DeleteAck, PublicCardPayload, RemoteCardRecord, SaveAck,
    SaveCardRequest,
};

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// The remote card service as the sync engine sees it. `delete_card` is the
/// primary `DELETE /cards/{id}` route; `delete_card_fallback` is the
/// `POST /cards/delete` route older backends expose instead. The engine
/// chains them.
#[async_trait]
pub trait CardService: Send + Sync {
    async fn list_cards(&self, token: &str) -> Result<Vec<RemoteCardRecord>, RemoteError>;
    async fn save_card(
        &self,
        token: &str,
        request: &SaveCardRequest,
    ) -> Result<SaveAck, RemoteError>;
    async fn delete_card(&self, token: &str, card_id: &str) -> Result<DeleteAck, RemoteError>;
    async fn delete_card_fallback(
        &self,
        token: &str,
        card_id: &str,
    ) -> Result<DeleteAck, RemoteError>;
    async fn fetch_public_card(&self, card_id: &str) -> Result<PublicCardPayload, RemoteError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RemoteError>;
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, RemoteError>;
}

/// HTTP implementation of [`CardService`] over reqwest.
pub struct HttpCardService {
    client: Client,
    base_url: String,
}

impl HttpCardService {
    /// Create a client for the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RemoteError> {
        // Normalize URL - ensure no trailing slash
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RemoteError::InvalidUrl(
                "URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Build full URL for a path
    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    /// Map non-success statuses to the error taxonomy.
    async fn check(path: &str, response: Response) -> Result<Response, RemoteError> {
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::AuthFailed),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(path.to_string())),
            status if !status.is_success() => Err(RemoteError::Server {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl CardService for HttpCardService {
    async fn list_cards(&self, token: &str) -> Result<Vec<RemoteCardRecord>, RemoteError> {
        let response = self
            .client
            .get(self.url("cards"))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check("cards", response).await?;

        let payload: CardListPayload = response.json().await?;
        Ok(payload.into_records())
    }

    async fn save_card(
        &self,
        token: &str,
        request: &SaveCardRequest,
    ) -> Result<SaveAck, RemoteError> {
        let response = self
            .client
            .post(self.url("cards/save"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        let response = Self::check("cards/save", response).await?;
        Ok(response.json().await?)
    }

    async fn delete_card(&self, token: &str, card_id: &str) -> Result<DeleteAck, RemoteError> {
        let path = format!("cards/{}", urlencoding::encode(card_id));
        let response = self
            .client
            .delete(self.url(&path))
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::check(&path, response).await?;

        // Older backends answer deletes with an empty body
        Ok(response
            .json()
            .await
            .unwrap_or(DeleteAck { ok: true }))
    }

    async fn delete_card_fallback(
        &self,
        token: &str,
        card_id: &str,
    ) -> Result<DeleteAck, RemoteError> {
        let response = self
            .client
            .post(self.url("cards/delete"))
            .bearer_auth(token)
            .json(&serde_json::json!({ "id": card_id }))
            .send()
            .await?;
        let response = Self::check("cards/delete", response).await?;
        Ok(response
            .json()
            .await
            .unwrap_or(DeleteAck { ok: true }))
    }

    async fn fetch_public_card(&self, card_id: &str) -> Result<PublicCardPayload, RemoteError> {
        let path = format!("card/{}", urlencoding::encode(card_id));
        let response = self.client.get(self.url(&path)).send().await?;
        let response = Self::check(&path, response).await?;
        Ok(response.json().await?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RemoteError> {
        let response = self
            .client
            .post(self.url("auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let response = Self::check("auth/login", response).await?;
        Ok(response.json().await?)
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, RemoteError> {
        let response = self
            .client
            .post(self.url("auth/register"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        let response = Self::check("auth/register", response).await?;
        Ok(response.json().await?)
    }
}
