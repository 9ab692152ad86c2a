//! Application coordinator.
//!
//! `App` owns the session, the API client, and the current route, and is
//! the only place ordinary navigation happens. Route changes go through
//! the guard; the single exception is the forced-logout redirect raised
//! by the API layer, which [`App::apply_forced_redirect`] applies without
//! guard evaluation.

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::{CredentialStore, SessionStore};
use crate::config::Config;
use crate::router::{guard, LogoutSignal, Route};

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub api: ApiClient,
    pub logout: LogoutSignal,
    pub current_route: Route,
}

impl App {
    /// Create the application, restoring config and any persisted session.
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let session = match config.session_dir() {
            Ok(dir) => SessionStore::open_in_dir(dir),
            Err(e) => {
                warn!(error = %e, "No session directory, session will not survive restart");
                SessionStore::in_memory()
            }
        };

        Self::assemble(config, session)
    }

    /// Wire the pieces together around an existing session.
    pub fn assemble(config: Config, session: SessionStore) -> Result<Self> {
        let logout = LogoutSignal::new();
        let api = ApiClient::new(config.base_url(), session.clone(), logout.clone())?;
        // Initial load routes through the entry destination
        let current_route = guard::resolve(Route::Entry, session.is_authenticated());

        Ok(Self {
            config,
            session,
            api,
            logout,
            current_route,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigate to a destination. The guard is consulted on every attempt
    /// and may substitute the destination; the route actually reached is
    /// returned.
    pub fn navigate(&mut self, to: Route) -> Route {
        let resolved = guard::resolve(to, self.session.is_authenticated());
        if resolved != to {
            debug!(requested = to.path(), resolved = resolved.path(), "Navigation redirected");
        }
        self.current_route = resolved;
        resolved
    }

    /// Apply a pending forced-logout redirect, if any. Bypasses the guard:
    /// this must land even if other navigation state is mid-transition.
    /// Returns true when a redirect was applied.
    pub fn apply_forced_redirect(&mut self) -> bool {
        if self.logout.take() {
            self.current_route = Route::Login;
            return true;
        }
        false
    }

    // =========================================================================
    // Authentication flows
    // =========================================================================

    /// Exchange credentials for a session and land on the default
    /// authenticated route.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let token = self.api.login(username, password).await?;
        self.session.set_token(Some(token.access_token));

        // Identity is a nicety; the session is valid without it
        match self.api.current_user().await {
            Ok(user) => self.session.set_user(Some(user)),
            Err(e) => warn!(error = %e, "Failed to fetch user identity"),
        }

        if let Err(e) = CredentialStore::store(username, password) {
            warn!(error = %e, "Failed to store credentials");
        }

        self.config.last_username = Some(username.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!(username, "Login successful");
        self.navigate(Route::Entry);
        Ok(())
    }

    /// Explicit logout: drop the session and return to the login route.
    pub fn logout(&mut self) {
        self.session.clear();
        self.navigate(Route::Login);
        info!("Logged out");
    }

    // =========================================================================
    // View data
    // =========================================================================

    /// Fetch all decks, then their details concurrently. A deck whose
    /// detail fetch fails falls back to its list summary; the failure is
    /// the caller's to notice only if every request failed.
    pub async fn decks_overview(&self) -> Result<Vec<Value>> {
        let decks = self.api.decks().await?;

        let detail_futures: Vec<_> = decks
            .iter()
            .map(|deck| {
                let id = deck.get("id").and_then(Value::as_i64);
                async move {
                    match id {
                        Some(id) => self.api.deck_detail(id).await.ok(),
                        None => None,
                    }
                }
            })
            .collect();

        let details = futures::future::join_all(detail_futures).await;

        let overview = decks
            .into_iter()
            .zip(details)
            .map(|(summary, detail)| detail.unwrap_or(summary))
            .collect();
        Ok(overview)
    }
}
