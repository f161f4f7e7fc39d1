// CRM booking platform client - library root

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod request;

pub use error::{ClientError, Result};
pub use http_client::ApiClient;
pub use request::{Method, RequestDescriptor};
