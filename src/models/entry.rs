use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who can see a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    FollowersOnly,
    Public,
}

/// A journal entry as the server returns it.
///
/// `author_username` is only populated on public listings; the server omits
/// it for the owner's own entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "authorUsername")]
    pub author_username: Option<String>,
    #[serde(default, rename = "authorProfilePicture")]
    pub author_profile_picture: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating or updating an entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewEntry {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

/// Page envelope the server wraps list responses in.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(default, rename = "totalElements")]
    pub total_elements: u64,
}
