//! Authentication module: what "logged in" means at any instant.
//!
//! This module provides:
//! - `CredentialStore`: durable storage for the token/expiry pair
//! - `expiry`: the fail-closed expiry clock for both strategies
//! - `SessionController`: the state machine tying store, clock, and the
//!   request layer into an observable session

pub mod expiry;
pub mod session;
pub mod store;

pub use expiry::{decode_embedded_expiry, is_expired, ExpiryStrategy};
pub use session::{Session, SessionController, SessionState, SessionStatus};
pub use store::{CredentialStore, StoredCredential};
