//! Data models for the collection API.
//!
//! Only authentication payloads get typed models here. Card, collection,
//! and deck payloads are passed through as opaque `serde_json::Value`s;
//! their shape belongs to the backend, not this client.

pub mod auth;

pub use auth::{NewUser, TokenResponse, UserIdentity};
