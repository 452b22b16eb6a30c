//! HTTP request layer for the Dailybook REST API.
//!
//! This module provides the `ApiClient` struct that every outbound call
//! flows through. It attaches the bearer credential when one is held,
//! executes the request, and classifies every failure into an [`ApiError`].
//! It never retries and never reacts to errors itself; policy lives with
//! the caller (the session controller reacts to `Auth`, nothing else).

use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{Entry, NewEntry, Notification, Page, Profile, ProfileUpdate};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the hosted Dailybook backend, used when no override is
/// configured.
pub(crate) const DEFAULT_BASE_URL: &str = "https://dailybook-x50p.onrender.com";

/// HTTP request timeout in seconds.
/// 30s allows for slow cold-started backends while failing fast enough for
/// good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Successful login payload: the credential and, when the deployment uses
/// the external-expiry strategy, the expiry the server assigned to it
/// (epoch milliseconds on the wire).
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(
        default,
        rename = "expiresAt",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Decoded response body, split by declared content type.
enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

/// API client for the Dailybook service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the default backend
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a new API client against a specific backend
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the held token; subsequent authenticated calls fail locally.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(), // Cheap clone, shares connection pool
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    // ===== Request execution =====

    /// Execute one request and decode the body by its declared content type.
    ///
    /// The credential is attached whenever one is held, whether or not the
    /// endpoint strictly requires it; per-endpoint auth decisions are a
    /// known source of subtle bugs. If the call requires auth and no
    /// credential is held, this fails locally without a network round trip.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        requires_auth: bool,
    ) -> Result<ResponseBody, ApiError> {
        if requires_auth && self.token.is_none() {
            return Err(ApiError::missing_credential());
        }

        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.decode_response(&url, response).await
    }

    /// Send a raw payload with an explicit content type, bypassing the JSON
    /// default (file and image uploads).
    pub async fn send_binary<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        content_type: &str,
        payload: Vec<u8>,
        requires_auth: bool,
    ) -> Result<T, ApiError> {
        if requires_auth && self.token.is_none() {
            return Err(ApiError::missing_credential());
        }

        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .request(method, &url)
            .header(header::CONTENT_TYPE, content_type)
            .body(payload);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        match self.decode_response(&url, response).await? {
            ResponseBody::Json(value) => Self::from_json_value(value),
            ResponseBody::Text(_) => Err(ApiError::invalid_response(
                "expected a JSON response to an upload",
            )),
        }
    }

    /// Classify the status and decode the body as JSON or raw text.
    async fn decode_response(
        &self,
        url: &str,
        response: reqwest::Response,
    ) -> Result<ResponseBody, ApiError> {
        let status = response.status();
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);
        let text = response.text().await?;

        if !status.is_success() {
            debug!(%status, url, "Request failed");
            return Err(ApiError::from_status(status, &text));
        }

        if is_json {
            let value = serde_json::from_str(&text).map_err(|err| {
                ApiError::invalid_response(format!("undecodable JSON from {}: {}", url, err))
            })?;
            Ok(ResponseBody::Json(value))
        } else {
            Ok(ResponseBody::Text(text))
        }
    }

    fn from_json_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
        serde_json::from_value(value)
            .map_err(|err| ApiError::invalid_response(format!("unexpected response shape: {}", err)))
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        requires_auth: bool,
    ) -> Result<T, ApiError> {
        match self.execute(method, path, body, requires_auth).await? {
            ResponseBody::Json(value) => Self::from_json_value(value),
            ResponseBody::Text(_) => Err(ApiError::invalid_response(format!(
                "expected JSON from {}, got text",
                path
            ))),
        }
    }

    /// For endpoints that answer with a plain-text confirmation.
    async fn request_text(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        requires_auth: bool,
    ) -> Result<String, ApiError> {
        match self.execute(method, path, body, requires_auth).await? {
            ResponseBody::Text(text) => Ok(text),
            ResponseBody::Json(value) => Ok(value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string())),
        }
    }

    /// For endpoints whose response body carries nothing of interest.
    async fn request_unit(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        requires_auth: bool,
    ) -> Result<(), ApiError> {
        self.execute(method, path, body, requires_auth).await?;
        Ok(())
    }

    fn body<B: Serialize>(body: &B) -> Option<serde_json::Value> {
        serde_json::to_value(body).ok()
    }

    // ===== Auth =====

    /// Create an account; returns the server's confirmation text.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        self.request_text(Method::POST, "/api/auth/register", Some(body), false)
            .await
    }

    /// Exchange username and password for a credential.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });
        self.request_json(Method::POST, "/api/auth/login", Some(body), false)
            .await
    }

    // ===== Profile =====

    /// Fetch the logged-in user's profile
    pub async fn fetch_my_profile(&self) -> Result<Profile, ApiError> {
        self.request_json(Method::GET, "/api/profile", None, true)
            .await
    }

    /// Update the logged-in user's profile fields
    pub async fn update_my_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.request_json(Method::PUT, "/api/profile", Self::body(update), true)
            .await
    }

    /// Public profile lookup by username
    pub async fn fetch_user_profile(&self, username: &str) -> Result<Profile, ApiError> {
        let path = format!("/api/profile/{}", urlencoding::encode(username));
        self.request_json(Method::GET, &path, None, false).await
    }

    // ===== Entries (private, require auth) =====

    pub async fn fetch_my_entries(&self) -> Result<Vec<Entry>, ApiError> {
        self.request_json(Method::GET, "/api/entries", None, true)
            .await
    }

    pub async fn fetch_entry(&self, id: i64) -> Result<Entry, ApiError> {
        let path = format!("/api/entries/{}", id);
        self.request_json(Method::GET, &path, None, true).await
    }

    pub async fn create_entry(&self, entry: &NewEntry) -> Result<Entry, ApiError> {
        self.request_json(Method::POST, "/api/entries", Self::body(entry), true)
            .await
    }

    pub async fn update_entry(&self, id: i64, entry: &NewEntry) -> Result<Entry, ApiError> {
        let path = format!("/api/entries/{}", id);
        self.request_json(Method::PUT, &path, Self::body(entry), true)
            .await
    }

    pub async fn delete_entry(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/api/entries/{}", id);
        self.request_unit(Method::DELETE, &path, None, true).await
    }

    // ===== Public entries (no auth required) =====

    /// Explore public entries, optionally filtered by tag
    pub async fn list_public_entries(
        &self,
        page: u32,
        size: u32,
        tag: Option<&str>,
    ) -> Result<Page<Entry>, ApiError> {
        let mut path = format!("/api/public/entries?page={}&size={}", page, size);
        if let Some(tag) = tag {
            path.push_str(&format!("&tag={}", urlencoding::encode(tag)));
        }
        self.request_json(Method::GET, &path, None, false).await
    }

    /// Full-text search across public entries
    pub async fn search_public_entries(
        &self,
        query: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Entry>, ApiError> {
        let path = format!(
            "/api/public/entries/search?q={}&page={}&size={}",
            urlencoding::encode(query),
            page,
            size
        );
        self.request_json(Method::GET, &path, None, false).await
    }

    /// Public entries by a specific author
    pub async fn list_user_entries(
        &self,
        username: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Entry>, ApiError> {
        let path = format!(
            "/api/users/{}/entries?page={}&size={}",
            urlencoding::encode(username),
            page,
            size
        );
        self.request_json(Method::GET, &path, None, false).await
    }

    // ===== Follow graph =====

    pub async fn fetch_my_followers(&self) -> Result<Vec<String>, ApiError> {
        self.request_json(Method::GET, "/api/follow/followers", None, true)
            .await
    }

    pub async fn fetch_my_following(&self) -> Result<Vec<String>, ApiError> {
        self.request_json(Method::GET, "/api/follow/following", None, true)
            .await
    }

    /// Usernames with a pending request to follow the logged-in user
    pub async fn fetch_pending_follow_requests(&self) -> Result<Vec<String>, ApiError> {
        self.request_json(Method::GET, "/api/follow/requests", None, true)
            .await
    }

    pub async fn approve_follow_request(&self, username: &str) -> Result<(), ApiError> {
        let path = format!(
            "/api/follow/requests/{}/approve",
            urlencoding::encode(username)
        );
        self.request_unit(Method::POST, &path, None, true).await
    }

    pub async fn reject_follow_request(&self, username: &str) -> Result<(), ApiError> {
        let path = format!(
            "/api/follow/requests/{}/reject",
            urlencoding::encode(username)
        );
        self.request_unit(Method::POST, &path, None, true).await
    }

    pub async fn follow(&self, username: &str) -> Result<(), ApiError> {
        let path = format!("/api/follow/{}", urlencoding::encode(username));
        self.request_unit(Method::POST, &path, None, true).await
    }

    pub async fn unfollow(&self, username: &str) -> Result<(), ApiError> {
        let path = format!("/api/follow/{}", urlencoding::encode(username));
        self.request_unit(Method::DELETE, &path, None, true).await
    }

    // ===== Notifications =====

    pub async fn fetch_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.request_json(Method::GET, "/api/notifications", None, true)
            .await
    }

    pub async fn fetch_unread_count(&self) -> Result<u64, ApiError> {
        self.request_json(Method::GET, "/api/notifications/unread-count", None, true)
            .await
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<(), ApiError> {
        let path = format!("/api/notifications/{}/read", id);
        self.request_unit(Method::PUT, &path, None, true).await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.request_unit(Method::PUT, "/api/notifications/read-all", None, true)
            .await
    }
}
