use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A notification delivered to the logged-in user.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_parses() {
        let json = r#"{"id": 4, "type": "FOLLOW", "message": "bob followed you", "read": false}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind.as_deref(), Some("FOLLOW"));
        assert!(!n.read);
    }
}
