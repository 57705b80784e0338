use exactmails_api::UserProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted session: bearer token plus a snapshot of the profile.
///
/// The token is encrypted using XOR with a machine-specific key for basic
/// obfuscation. For production use, consider using proper encryption
/// libraries like ring or sodiumoxide. The profile snapshot is what lets the
/// UI render a name and credit counters before the first refresh completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStore {
    #[serde(skip)]
    path: Option<PathBuf>,
    token: Option<StoredToken>,
    profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    /// Encrypted token value
    encrypted_value: Vec<u8>,
}

impl SessionStore {
    /// Create an empty, in-memory store (nothing is written until `save`).
    pub fn new() -> Self {
        Self {
            path: None,
            token: None,
            profile: None,
        }
    }

    /// Store rooted at an explicit file, mainly for tests.
    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            token: None,
            profile: None,
        }
    }

    /// Load the session from disk, or start fresh if none exists yet.
    pub fn load() -> crate::Result<Self> {
        Self::load_from(Self::store_path()?)
    }

    pub fn load_from(path: PathBuf) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let mut store: SessionStore = serde_json::from_str(&contents).map_err(|e| {
                crate::Error::ConfigError(format!("Failed to parse session store: {}", e))
            })?;
            store.path = Some(path);
            Ok(store)
        } else {
            Ok(Self::at_path(path))
        }
    }

    /// Save the session to disk.
    pub fn save(&self) -> crate::Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Self::store_path()?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            crate::Error::ConfigError(format!("Failed to serialize session store: {}", e))
        })?;

        std::fs::write(&path, contents)?;
        Ok(())
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(StoredToken {
            encrypted_value: self.encrypt(token),
        });
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .as_ref()
            .map(|stored| self.decrypt(&stored.encrypted_value))
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_profile(&mut self, profile: UserProfile) {
        self.profile = Some(profile);
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// Drop token and snapshot (sign-out).
    pub fn clear(&mut self) {
        self.token = None;
        self.profile = None;
    }

    /// Session file path under the platform data dir.
    fn store_path() -> crate::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("exactmails");

        Ok(data_dir.join("session.json"))
    }

    /// Simple XOR encryption with machine-specific key
    /// For basic obfuscation - not cryptographically secure
    fn encrypt(&self, data: &str) -> Vec<u8> {
        let key = self.machine_key();
        data.bytes()
            .enumerate()
            .map(|(i, b)| b ^ key[i % key.len()])
            .collect()
    }

    /// Decrypt XOR-encrypted data
    fn decrypt(&self, data: &[u8]) -> String {
        let key = self.machine_key();
        let decrypted: Vec<u8> = data
            .iter()
            .enumerate()
            .map(|(i, &b)| b ^ key[i % key.len()])
            .collect();
        String::from_utf8_lossy(&decrypted).to_string()
    }

    /// Generate a machine-specific key for encryption
    /// Uses hostname + username as seed
    fn machine_key(&self) -> Vec<u8> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hostname = hostname::get()
            .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
            .to_string_lossy()
            .to_string();

        let username = whoami::username();
        let seed = format!("exactmails-{}-{}", hostname, username);

        let mut hasher = DefaultHasher::new();
        seed.hash(&mut hasher);
        let hash = hasher.finish();

        // Generate 32-byte key from hash
        let mut key = Vec::with_capacity(32);
        let mut val = hash;
        for _ in 0..4 {
            key.extend_from_slice(&val.to_le_bytes());
            val = val.wrapping_mul(1103515245).wrapping_add(12345);
        }
        key
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_profile() -> UserProfile {
        UserProfile {
            id: "u_1".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            profile_picture: None,
            api_key: "ak_live_1".into(),
            subscription_id: Some(3),
            subscription_plan_status: Some("active".into()),
            subscription_expiry: None,
            active_credits: 120,
            used_credits: 30,
            new_requested_email: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_encryption_roundtrip() {
        let store = SessionStore::new();
        let original = "em_access_token_12345";

        let encrypted = store.encrypt(original);
        let decrypted = store.decrypt(&encrypted);

        assert_eq!(original, decrypted);
        assert_ne!(encrypted, original.as_bytes());
    }

    #[test]
    fn test_token_storage() {
        let mut store = SessionStore::new();

        store.set_token("em_access_token");
        assert!(store.has_token());
        assert_eq!(store.token(), Some("em_access_token".to_string()));
    }

    #[test]
    fn test_clear_drops_token_and_snapshot() {
        let mut store = SessionStore::new();
        store.set_token("em_access_token");
        store.set_profile(sample_profile());

        store.clear();
        assert!(!store.has_token());
        assert!(store.profile().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::at_path(path.clone());
        store.set_token("em_access_token");
        store.set_profile(sample_profile());
        store.save().unwrap();

        let loaded = SessionStore::load_from(path).unwrap();
        assert_eq!(loaded.token(), Some("em_access_token".to_string()));
        assert_eq!(loaded.profile().unwrap().username, "ada");
    }
}
