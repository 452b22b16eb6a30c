//! Data models for Dailybook entities.
//!
//! This module contains the data structures exchanged with the REST API:
//!
//! - `Profile`, `ProfileUpdate`: the current or a public user
//! - `Entry`, `NewEntry`, `Visibility`: journal entries
//! - `Page`: the pagination envelope around list responses
//! - `Notification`: notification feed items

pub mod entry;
pub mod notification;
pub mod profile;

pub use entry::{Entry, NewEntry, Page, Visibility};
pub use notification::Notification;
pub use profile::{Profile, ProfileUpdate};
