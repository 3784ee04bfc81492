//! Domain model for a parent account.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// An authenticated account that owns students.
#[derive(Debug, Clone, PartialEq)]
pub struct Parent {
    pub id: String,
    /// Stored lower-cased
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

impl Parent {
    pub fn generate_id(epoch_millis: i64) -> String {
        super::generate_id("parent", epoch_millis)
    }

    /// Create a parent record with a freshly salted password digest
    pub fn new(email: &str, password: &str, now: DateTime<Utc>) -> Self {
        let password_salt = Uuid::new_v4().simple().to_string();
        let password_hash = Self::hash_password(&password_salt, password);
        Self {
            id: Self::generate_id(now.timestamp_millis()),
            email: Self::normalize_email(email),
            password_hash,
            password_salt,
            created_at: now,
        }
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Hex-encoded SHA-256 of `salt || password`
    pub fn hash_password(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn verify_password(&self, password: &str) -> bool {
        Self::hash_password(&self.password_salt, password) == self.password_hash
    }
}
