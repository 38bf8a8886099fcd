//! Session domain module.
//!
//! This module contains the authenticated-identity model and the interfaces of
//! the collaborators the session lifecycle depends on.
//!
//! # Module Structure
//!
//! - `model`: `Profile`, `Credential`, `Session` and the `SessionState` machine
//! - `credential_service`: contract of the remote credential service
//! - `key_value`: durable key-value storage holding the session token
//!
//! # Usage
//!
//! ```ignore
//! use reelsync_core::session::{CredentialService, KeyValueStore, SessionState};
//! ```

mod credential_service;
mod key_value;
mod model;

// Re-export public API
pub use credential_service::{AuthGrant, CredentialService};
pub use key_value::{KeyValueStore, SESSION_TOKEN_KEY};
pub use model::{Credential, Profile, Session, SessionState};
