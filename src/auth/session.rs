//! Session controller: the client's single source of truth for "logged in".
//!
//! Owns the API client, the credential store, and the expiry strategy, and
//! derives the session state from them. `authenticated` is always computed
//! from the held credential against the clock at the moment it is asked
//! for, never stored as a flag, so authenticated UI cannot outlive expiry.

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, LoginResponse};
use crate::auth::store::{CredentialStore, StoredCredential};
use crate::auth::{expiry, ExpiryStrategy};
use crate::models::Profile;

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No valid credential is held.
    Unauthenticated,
    /// A persisted credential passed the local expiry check and the profile
    /// fetch is in flight; views treat this as "not yet decided" and show
    /// neither the logged-in nor the logged-out UI.
    Restoring,
    /// Valid credential held; the profile may or may not be hydrated.
    Authenticated,
}

/// Whether the session has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Ready,
}

/// Point-in-time view handed to consumers.
///
/// `authenticated` and `user` are recomputed against the clock at snapshot
/// time; a snapshot taken after expiry reports logged-out even if no code
/// path has run in between.
#[derive(Debug, Clone)]
pub struct Session {
    pub authenticated: bool,
    pub user: Option<Profile>,
    pub status: SessionStatus,
}

/// Orchestrates the store, the expiry clock, and the request layer into an
/// observable session. Constructed once at application start and passed
/// explicitly to every consumer; there is no process-global session.
pub struct SessionController {
    api: ApiClient,
    store: CredentialStore,
    strategy: ExpiryStrategy,
    state: SessionState,
    credential: Option<StoredCredential>,
    user: Option<Profile>,
}

impl SessionController {
    pub fn new(api: ApiClient, store: CredentialStore, strategy: ExpiryStrategy) -> Self {
        Self {
            api,
            store,
            strategy,
            state: SessionState::Unauthenticated,
            credential: None,
            user: None,
        }
    }

    /// The request client with the current credential attached. Fetch this
    /// per call; clones taken earlier do not observe later token changes.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True iff a credential is held and not expired right now.
    pub fn is_authenticated(&self) -> bool {
        self.credential
            .as_ref()
            .map(|credential| {
                !expiry::is_expired(
                    self.strategy,
                    &credential.token,
                    credential.expires_at,
                    Utc::now(),
                )
            })
            .unwrap_or(false)
    }

    /// Snapshot of the current session; cheap, never blocks.
    pub fn session(&self) -> Session {
        let authenticated = self.is_authenticated();
        Session {
            authenticated,
            // The profile is only ever surfaced while the credential still
            // checks out, even if it was hydrated moments before expiry.
            user: if authenticated { self.user.clone() } else { None },
            status: if self.state == SessionState::Restoring {
                SessionStatus::Loading
            } else {
                SessionStatus::Ready
            },
        }
    }

    /// Startup restore: trust the persisted credential only after the local
    /// expiry check, then let the server have the final word through the
    /// profile fetch.
    pub async fn restore(&mut self) -> Result<()> {
        let Some(credential) = self.store.load()? else {
            self.state = SessionState::Unauthenticated;
            return Ok(());
        };

        if expiry::is_expired(
            self.strategy,
            &credential.token,
            credential.expires_at,
            Utc::now(),
        ) {
            debug!("Persisted credential expired or missing expiry, clearing");
            self.store.clear()?;
            self.state = SessionState::Unauthenticated;
            return Ok(());
        }

        self.api.set_token(credential.token.clone());
        self.credential = Some(credential);
        self.state = SessionState::Restoring;

        let result = self.api.fetch_my_profile().await;
        self.finish_profile_fetch(result);
        Ok(())
    }

    /// Authenticate and persist the returned credential.
    ///
    /// Fail-closed on the credential itself: under the external strategy a
    /// login response without an expiry is rejected outright rather than
    /// kept as an indefinite session, and under the embedded strategy the
    /// token must carry a decodable `exp` claim.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let response = self.api.login(username, password).await?;
        let credential = self.credential_from_login(response)?;

        // Persist before anything can observe the new session; the saved
        // pair atomically replaces any previous credential.
        if let Err(err) = self.store.save(&credential) {
            warn!(error = %err, "Failed to persist credential; session is memory-only");
        }
        self.api.set_token(credential.token.clone());
        self.credential = Some(credential);
        self.user = None;
        self.state = SessionState::Authenticated;

        // Hydrate the profile. The credential was just proven valid by the
        // login itself, so only an auth rejection can demote here; any
        // other failure leaves the session intact without a profile.
        let result = self.api.fetch_my_profile().await;
        self.finish_profile_fetch(result);
        Ok(())
    }

    /// Create an account. No session effect; returns the server's
    /// confirmation text for the caller to display.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        self.api.register(username, email, password).await
    }

    /// Drop the session. Synchronous and idempotent; a storage failure is
    /// logged but the in-memory state is reset regardless.
    pub fn logout(&mut self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear stored credential");
        }
        self.api.clear_token();
        self.credential = None;
        self.user = None;
        self.state = SessionState::Unauthenticated;
    }

    /// Hook for domain callers: feed back any request failure after the
    /// call returns. Only an auth rejection has a session effect; every
    /// other kind is the caller's to display, never a reason to log out.
    pub fn observe_error(&mut self, err: &ApiError) {
        if err.is_auth() {
            info!("Credential rejected mid-session, logging out");
            self.logout();
        }
    }

    fn credential_from_login(&self, response: LoginResponse) -> Result<StoredCredential, ApiError> {
        let credential = StoredCredential {
            token: response.token,
            expires_at: response.expires_at,
        };
        if expiry::is_expired(
            self.strategy,
            &credential.token,
            credential.expires_at,
            Utc::now(),
        ) {
            return Err(ApiError::Auth {
                status: None,
                message: "login response carried no usable expiry".to_string(),
            });
        }
        Ok(credential)
    }

    /// Fold a completed profile fetch into session state.
    ///
    /// Overlapping fetches (a restore racing an immediately-following
    /// login) are not mutually ordered; the last result applied wins. Both
    /// describe the same authenticated identity, so that is acceptable.
    fn finish_profile_fetch(&mut self, result: Result<Profile, ApiError>) {
        match result {
            Ok(profile) => {
                self.user = Some(profile);
                self.state = SessionState::Authenticated;
            }
            Err(err) if err.is_auth() => {
                info!("Server rejected credential during profile fetch, logging out");
                self.logout();
            }
            Err(err) => {
                // Transient fault: keep the credential and stay
                // authenticated without a hydrated profile, so an outage
                // does not force re-login.
                warn!(error = %err, "Profile fetch failed non-fatally");
                self.state = SessionState::Authenticated;
            }
        }
    }
}
