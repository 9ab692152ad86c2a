//! Session state and credential handling.
//!
//! This module provides:
//! - `SessionStore` / `SessionReader`: the process-wide authentication
//!   state, persisted across restarts
//! - `SessionStorage`: the durable-storage boundary behind the store
//! - `CredentialStore`: OS-level password storage via keyring
//!
//! A session is exactly a bearer token (plus optional identity); there is
//! no local expiry, the backend decides when a token stops working.

pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::CredentialStore;
pub use session::{SessionReader, SessionRecord, SessionStore};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
