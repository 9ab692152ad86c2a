//! Token-based session state, the single source of truth for
//! "is this user authenticated".
//!
//! All mutation funnels through [`SessionStore::set_token`] and
//! [`SessionStore::clear`]; every mutation persists (or erases) the durable
//! record together with the in-memory update. Observers that must not
//! mutate the session get a [`SessionReader`].

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::UserIdentity;

use super::storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};

/// The persisted session: the bearer token plus optional identity.
///
/// A record exists if and only if a token is present, so "authenticated"
/// is exactly "record present". Tokens carry no local expiry; the backend
/// decides validity and the client learns of it through a 401.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserIdentity>,
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(token: String) -> Self {
        Self {
            token,
            user: None,
            created_at: Utc::now(),
        }
    }

    /// Minutes since the session was established (for display/logging)
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.created_at).num_minutes().max(0)
    }
}

type SharedState = Arc<RwLock<Option<SessionRecord>>>;

/// Owning handle to the session. Clone is cheap - state is shared via Arc,
/// so every clone observes the latest mutation.
#[derive(Clone)]
pub struct SessionStore {
    state: SharedState,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Open the session against a storage backend, restoring any record
    /// persisted by a previous run. A storage failure degrades to an
    /// empty in-memory session rather than an error.
    pub fn open(storage: impl SessionStorage + 'static) -> Self {
        let initial = match storage.load() {
            Ok(record) => {
                if let Some(ref r) = record {
                    debug!(age_minutes = r.age_minutes(), "Restored persisted session");
                }
                record
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore session, starting unauthenticated");
                None
            }
        };
        Self {
            state: Arc::new(RwLock::new(initial)),
            storage: Arc::new(storage),
        }
    }

    /// Open a file-backed session store rooted at `dir`.
    pub fn open_in_dir(dir: std::path::PathBuf) -> Self {
        Self::open(FileSessionStorage::new(dir))
    }

    /// Session store with no durable backing. The session will not
    /// survive a restart.
    pub fn in_memory() -> Self {
        Self::open(MemorySessionStorage::default())
    }

    /// Read-only handle for observers (guard, UI).
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            state: Arc::clone(&self.state),
        }
    }

    /// The current bearer token, if any. Pure read.
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|r| r.token.clone())
    }

    /// The recorded identity, if one was attached after login.
    pub fn user(&self) -> Option<UserIdentity> {
        self.read().as_ref().and_then(|r| r.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    /// Replace the token. `Some` establishes a session and persists it;
    /// `None` drops the session and erases the durable record.
    ///
    /// Any identity attached to a previous token is discarded - it
    /// belonged to that credential.
    pub fn set_token(&self, token: Option<String>) {
        let record = token.map(SessionRecord::new);
        {
            let mut state = self.write();
            *state = record.clone();
        }
        self.persist(record.as_ref());
    }

    /// Attach the user identity to the current session. No-op when
    /// unauthenticated: identity cannot outlive its token.
    pub fn set_user(&self, user: Option<UserIdentity>) {
        let updated = {
            let mut state = self.write();
            match state.as_mut() {
                Some(record) => {
                    record.user = user;
                    Some(record.clone())
                }
                None => None,
            }
        };
        if let Some(ref record) = updated {
            self.persist(Some(record));
        }
    }

    /// Log out. Identical in effect to `set_token(None)`, but logging out
    /// is a distinct intent worth its own name.
    pub fn clear(&self) {
        self.set_token(None);
    }

    /// Best-effort durability: a storage failure downgrades the session
    /// to memory-only for this process, nothing more.
    fn persist(&self, record: Option<&SessionRecord>) {
        let result = match record {
            Some(r) => self.storage.store(r),
            None => self.storage.erase(),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session, continuing in memory only");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<SessionRecord>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<SessionRecord>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Accessor-only view of the session. Handed to components that consult
/// authentication state but must not change it.
#[derive(Clone)]
pub struct SessionReader {
    state: SharedState,
}

impl SessionReader {
    pub fn token(&self) -> Option<String> {
        self.read().as_ref().map(|r| r.token.clone())
    }

    pub fn user(&self) -> Option<UserIdentity> {
        self.read().as_ref().and_then(|r| r.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Option<SessionRecord>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
