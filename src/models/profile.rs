use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-owned record for the current or a public user.
///
/// The session controller caches the logged-in user's profile in memory
/// only; it is re-fetched whenever a valid credential is found at startup,
/// never persisted across reloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, rename = "profilePicture")]
    pub profile_picture: Option<String>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields accepted by `PUT /api/profile`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "profilePicture", skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parses_with_missing_optionals() {
        let json = r#"{"username": "alice"}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.username, "alice");
        assert!(profile.bio.is_none());
        assert!(profile.profile_picture.is_none());
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"bio": "hello"}));
    }
}
