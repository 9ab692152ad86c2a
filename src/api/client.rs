//! API client for the card-collection backend.
//!
//! Every outgoing request passes through here: the current session token
//! is attached as a bearer credential, and every response is inspected for
//! authorization failure. A 401 clears the session and raises the forced
//! redirect to login; all other errors propagate to the caller untouched.

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::auth::SessionStore;
use crate::models::{NewUser, TokenResponse, UserIdentity};
use crate::router::LogoutSignal;

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the collection backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the session/logout handles are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    logout: LogoutSignal,
}

impl ApiClient {
    /// Create a new API client bound to a session and a logout signal.
    pub fn new(base_url: String, session: SessionStore, logout: LogoutSignal) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            logout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer header for the current session, nothing when unauthenticated.
    /// Endpoints like login and register are expected to succeed without
    /// one; anything else will come back 401 and be handled below.
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = self.session.token() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// React to a rejected credential: drop the session so the stale token
    /// is never reused, then force the redirect to login. Safe to hit from
    /// any number of in-flight requests at once - clearing an absent
    /// session is a no-op and the signal collapses duplicate raises.
    fn handle_unauthorized(&self) {
        self.session.clear();
        self.logout.raise();
    }

    /// Classify a response. Success passes through; 401 triggers the
    /// forced-logout path; every other failure maps to an `ApiError` for
    /// the caller to handle.
    async fn check_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized.into());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body).into())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Exchange credentials for a bearer token.
    /// The backend expects an OAuth2 password form, not JSON.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let url = self.url("/auth/token");
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .context("Failed to send authentication request")?;

        let response = self.check_response(response).await?;
        response
            .json()
            .await
            .context("Failed to parse auth response")
    }

    /// Create a new account. No token is issued; log in afterwards.
    pub async fn register(&self, new_user: &NewUser) -> Result<UserIdentity> {
        self.post_json("/auth/register", new_user).await
    }

    /// Fetch the identity behind the current token
    pub async fn current_user(&self) -> Result<UserIdentity> {
        self.get_json("/users/me").await
    }

    // ===== Cards =====

    /// Search card definitions by name
    pub async fn search_cards(&self, name: &str) -> Result<Vec<Value>> {
        let query: String = url_encode(name);
        let cards: Vec<Value> = self.get_json(&format!("/cards/search?name={}", query)).await?;
        debug!(count = cards.len(), "Card search results received");
        Ok(cards)
    }

    // ===== Collection =====

    /// Fetch the authenticated user's collection entries
    pub async fn collection(&self) -> Result<Vec<Value>> {
        let entries: Vec<Value> = self.get_json("/collection/cards/").await?;
        debug!(count = entries.len(), "Collection entries received");
        Ok(entries)
    }

    /// Add a card to the collection. The payload shape belongs to the
    /// backend and is passed through unmodified.
    pub async fn add_to_collection(&self, entry: &Value) -> Result<Value> {
        self.post_json("/collection/cards/", entry).await
    }

    // ===== Decks =====

    pub async fn decks(&self) -> Result<Vec<Value>> {
        let decks: Vec<Value> = self.get_json("/decks/").await?;
        debug!(count = decks.len(), "Decks received");
        Ok(decks)
    }

    pub async fn create_deck(&self, deck: &Value) -> Result<Value> {
        self.post_json("/decks/", deck).await
    }

    pub async fn deck_detail(&self, deck_id: i64) -> Result<Value> {
        self.get_json(&format!("/decks/{}/", deck_id)).await
    }

    pub async fn add_card_to_deck(&self, deck_id: i64, card: &Value) -> Result<Value> {
        self.post_json(&format!("/decks/{}/cards/", deck_id), card).await
    }
}

/// Percent-encode a query value. Covers the characters card names
/// actually contain; anything non-alphanumeric is escaped.
fn url_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;

    fn client_with(session: SessionStore, logout: LogoutSignal) -> ApiClient {
        ApiClient::new("http://127.0.0.1:8000".to_string(), session, logout)
            .expect("client should build")
    }

    #[test]
    fn test_auth_headers_carry_current_token() {
        let session = SessionStore::in_memory();
        let client = client_with(session.clone(), LogoutSignal::new());

        // Absent token, no header
        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());

        // Present token, exact bearer value
        session.set_token(Some("abc".to_string()));
        let headers = client.auth_headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );

        // Cleared again, header gone
        session.clear();
        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_unauthorized_clears_session_and_raises_redirect() {
        let session = SessionStore::in_memory();
        let logout = LogoutSignal::new();
        let client = client_with(session.clone(), logout.clone());

        session.set_token(Some("stale".to_string()));
        client.handle_unauthorized();

        assert!(!session.is_authenticated());
        assert!(logout.is_pending());
    }

    #[tokio::test]
    async fn test_concurrent_unauthorized_responses_are_idempotent() {
        let session = SessionStore::in_memory();
        let logout = LogoutSignal::new();
        let client = client_with(session.clone(), logout.clone());

        session.set_token(Some("stale".to_string()));

        // Several in-flight requests all coming back 401 at once
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.handle_unauthorized() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(!session.is_authenticated());
        // Exactly one redirect results, no matter how many failures
        assert!(logout.take());
        assert!(!logout.take());
    }

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new(
            "http://127.0.0.1:8000/".to_string(),
            SessionStore::in_memory(),
            LogoutSignal::new(),
        )
        .unwrap();
        assert_eq!(client.url("/auth/token"), "http://127.0.0.1:8000/auth/token");
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("Llanowar Elves"), "Llanowar%20Elves");
        assert_eq!(url_encode("Sol_Ring"), "Sol_Ring");
        assert_eq!(url_encode("Fire // Ice"), "Fire%20%2F%2F%20Ice");
    }
}
