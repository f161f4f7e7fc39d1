// Authentication module
// Session state storage, token refresh, and session end notification

mod handler;
mod manager;
mod refresh;
mod store;
mod types;

pub use handler::{LoggingHandler, SessionEndReason, SessionExpiredHandler};
pub use manager::SessionStore;
pub use refresh::refresh_access_token;
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use types::{
    Credentials, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SESSION_KEYS, USER_DATA_KEY, USER_ROLE_KEY,
};

pub(crate) use types::{LoginRequest, TokenPair};
