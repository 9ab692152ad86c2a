//! REST client module for the card-collection backend.
//!
//! This module provides the `ApiClient` for all traffic to the backend.
//! Authentication uses a JWT bearer token obtained from `/auth/token`;
//! attaching it, and reacting to its rejection, happens here and nowhere
//! else.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
