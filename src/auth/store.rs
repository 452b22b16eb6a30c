use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Credential file name in the data directory
const CREDENTIAL_FILE: &str = "credential.json";

/// The persisted credential pair.
///
/// `expires_at` is optional in storage because the embedded-claim strategy
/// carries expiry inside the token itself. Under the external strategy a
/// missing value is corrupt state: the expiry check fails closed and the
/// caller clears the pair rather than treating it as a valid session with
/// unknown expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub token: String,
    #[serde(
        default,
        rename = "expiresAt",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Durable storage for the current credential. Pure storage: no expiry
/// logic, no network. All writers go through `save`/`clear` so no two
/// write paths can produce an inconsistent token/expiry pair.
pub struct CredentialStore {
    data_dir: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Load the persisted credential, if any.
    ///
    /// A file that cannot be parsed is removed and reported as absent;
    /// corrupt state must never read as a session.
    pub fn load(&self) -> Result<Option<StoredCredential>> {
        let path = self.credential_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&path).context("Failed to read credential file")?;
        match serde_json::from_str(&contents) {
            Ok(credential) => Ok(Some(credential)),
            Err(err) => {
                warn!(error = %err, "Corrupt credential file, discarding");
                let _ = std::fs::remove_file(&path);
                Ok(None)
            }
        }
    }

    /// Persist the credential and its expiry as one pair.
    pub fn save(&self, credential: &StoredCredential) -> Result<()> {
        let path = self.credential_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(credential)?;
        std::fs::write(path, contents).context("Failed to write credential file")?;
        Ok(())
    }

    /// Remove the persisted credential; idempotent.
    pub fn clear(&self) -> Result<()> {
        let path = self.credential_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove credential file")?;
        }
        Ok(())
    }

    fn credential_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIAL_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, CredentialStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = store();
        let credential = StoredCredential {
            token: "t1".to_string(),
            expires_at: Some(Utc.timestamp_millis_opt(1_767_225_600_000).unwrap()),
        };
        store.save(&credential).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential));
    }

    #[test]
    fn test_round_trip_without_expiry() {
        let (_dir, store) = store();
        let credential = StoredCredential {
            token: "t1".to_string(),
            expires_at: None,
        };
        store.save(&credential).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential));
    }

    #[test]
    fn test_clear_then_load_is_absent() {
        let (_dir, store) = store();
        let credential = StoredCredential {
            token: "t1".to_string(),
            expires_at: None,
        };
        store.save(&credential).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing again is a no-op
        store.clear().unwrap();
    }

    #[test]
    fn test_missing_file_loads_as_absent() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let (dir, store) = store();
        std::fs::write(dir.path().join(CREDENTIAL_FILE), "{not json").unwrap();
        assert_eq!(store.load().unwrap(), None);
        // The corrupt file was removed, not left to poison the next load
        assert!(!dir.path().join(CREDENTIAL_FILE).exists());
    }

    #[test]
    fn test_save_replaces_previous_credential() {
        let (_dir, store) = store();
        store
            .save(&StoredCredential {
                token: "old".to_string(),
                expires_at: None,
            })
            .unwrap();
        store
            .save(&StoredCredential {
                token: "new".to_string(),
                expires_at: None,
            })
            .unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "new");
    }
}
