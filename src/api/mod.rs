//! REST API request layer for the Dailybook service.
//!
//! This module provides the `ApiClient` every outbound call flows through
//! and the `ApiError` taxonomy its failures are classified into.
//!
//! The API uses bearer token authentication; the token is attached to every
//! request while one is held.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
