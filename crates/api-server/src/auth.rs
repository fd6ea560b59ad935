//! Credential gate: SHA-256 password check against a configured user
//! table plus a required email domain. A simple access gate for a
//! single-team dashboard, not a security system.

use dashmap::DashMap;
use salesdash_core::config::AuthConfig;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub struct Authenticator {
    email_domain: String,
    /// lowercased email -> SHA-256 password hash (hex).
    users: HashMap<String, String>,
    /// Bearer token -> email of the logged-in user.
    sessions: DashMap<String, String>,
}

impl Authenticator {
    /// Build from config entries of the form `email:sha256hex`.
    /// Malformed entries are skipped with a warning.
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut users = HashMap::new();
        for entry in &config.users {
            match entry.split_once(':') {
                Some((email, hash)) if !email.is_empty() && !hash.is_empty() => {
                    users.insert(email.to_lowercase(), hash.to_string());
                }
                _ => warn!(entry = %entry, "ignoring malformed auth user entry"),
            }
        }
        Self {
            email_domain: config.email_domain.to_lowercase(),
            users,
            sessions: DashMap::new(),
        }
    }

    /// With no users configured the gate is disabled (local development).
    pub fn enabled(&self) -> bool {
        !self.users.is_empty()
    }

    pub fn valid_domain(&self, email: &str) -> bool {
        email
            .to_lowercase()
            .ends_with(&format!("@{}", self.email_domain))
    }

    /// Verify credentials and open a session. Email comparison is
    /// case-insensitive.
    pub fn login(&self, email: &str, password: &str) -> Option<String> {
        if !self.valid_domain(email) {
            return None;
        }
        let email = email.to_lowercase();
        let stored = self.users.get(&email)?;
        if *stored != hash_password(password) {
            return None;
        }
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), email);
        Some(token)
    }

    pub fn session_valid(&self, token: &str) -> bool {
        self.sessions.contains_key(token)
    }

    pub fn logout(&self, token: &str) {
        self.sessions.remove(token);
    }
}
