// Authentication types

use serde::{Deserialize, Serialize};

/// Store key for the short-lived bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Store key for the long-lived refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Store key for the cached role
pub const USER_ROLE_KEY: &str = "user_role";
/// Store key for the serialized profile
pub const USER_DATA_KEY: &str = "user_data";

/// Every key that belongs to a session
pub const SESSION_KEYS: [&str; 4] = [
    ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    USER_ROLE_KEY,
    USER_DATA_KEY,
];

/// Snapshot of the stored credential pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    /// An access token without a refresh token still works until it expires,
    /// but cannot be renewed
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Login request body
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login response: a fresh token pair
#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Refresh request body
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh response
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}
