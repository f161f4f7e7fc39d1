use std::sync::Arc;

use super::store::{KeyValueStore, MemoryStore};
use super::types::{
    Credentials, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_DATA_KEY, USER_ROLE_KEY,
};
use crate::models::{Role, UserProfile};

/// Session state for one logged-in user
///
/// Typed view over a [`KeyValueStore`]. Cloning shares the same backend.
/// Role and profile are cached for display only; the backend re-validates
/// the access token on every call.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Session backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Name of the backing store
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn access_token(&self) -> Option<String> {
        self.backend.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.backend.get(REFRESH_TOKEN_KEY)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token(),
            refresh_token: self.refresh_token(),
        }
    }

    /// Store a freshly issued token pair
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) {
        self.backend.set(ACCESS_TOKEN_KEY, access_token);
        self.backend.set(REFRESH_TOKEN_KEY, refresh_token);
    }

    /// Replace the access token in place (after a refresh)
    pub fn set_access_token(&self, access_token: &str) {
        self.backend.set(ACCESS_TOKEN_KEY, access_token);
    }

    pub fn role(&self) -> Option<Role> {
        self.backend.get(USER_ROLE_KEY).map(Role::from)
    }

    pub fn set_role(&self, role: &Role) {
        self.backend.set(USER_ROLE_KEY, role.as_str());
    }

    /// Cached profile; an unreadable entry is treated as absent
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.backend.get(USER_DATA_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable cached profile");
                None
            }
        }
    }

    pub fn set_profile(&self, profile: &UserProfile) {
        match serde_json::to_string(profile) {
            Ok(raw) => self.backend.set(USER_DATA_KEY, &raw),
            Err(e) => tracing::warn!(error = %e, "Failed to serialize profile for caching"),
        }
    }

    /// True when an access token is present. Says nothing about its validity.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Remove the given keys, each as an independent deletion
    pub fn clear(&self, keys: &[&str]) {
        for key in keys {
            self.backend.remove(key);
        }
    }

    /// Remove every session key
    pub fn clear_session(&self) {
        self.clear(&SESSION_KEYS);
        tracing::debug!(store = self.backend_name(), "Session state cleared");
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print tokens
        f.debug_struct("SessionStore")
            .field("backend", &self.backend.name())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
