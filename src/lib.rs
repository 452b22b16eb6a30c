//! Client core for the Dailybook journaling service.
//!
//! This crate implements the parts of the client with real invariants: the
//! credential store, the session expiry clock, the API request layer, and
//! the session controller that ties them together. Rendering, routing, and
//! forms live in the host application and consume everything here through
//! [`SessionController`] and [`ApiClient`].
//!
//! ```no_run
//! use dailybook_client::{ApiClient, ClientConfig, CredentialStore, SessionController};
//!
//! # async fn start() -> anyhow::Result<()> {
//! let config = ClientConfig::load()?;
//! let api = ApiClient::with_base_url(&config.api_base_url())?;
//! let store = CredentialStore::new(config.data_dir()?);
//! let mut session = SessionController::new(api, store, config.expiry_strategy);
//! session.restore().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, LoginResponse};
pub use auth::{
    CredentialStore, ExpiryStrategy, Session, SessionController, SessionState, SessionStatus,
    StoredCredential,
};
pub use config::ClientConfig;
