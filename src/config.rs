use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::BookingAction;

/// Default backend location
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";

/// Default refresh endpoint, relative to the base URL
pub const DEFAULT_REFRESH_ENDPOINT: &str = "/auth/token/refresh/";

/// CRM booking platform client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend API base URL
    #[arg(short = 'u', long, env = "CRM_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Token refresh endpoint (relative to the base URL)
    #[arg(long, env = "CRM_REFRESH_ENDPOINT", default_value = DEFAULT_REFRESH_ENDPOINT)]
    pub refresh_endpoint: String,

    /// Path to the session database
    #[arg(short = 's', long, env = "CRM_SESSION_STORE")]
    pub store: Option<String>,

    /// Keep the session in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// HTTP connect timeout in seconds (transport default when unset)
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT")]
    pub connect_timeout: Option<u64>,

    /// HTTP request timeout in seconds (transport default when unset)
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and store the session
    Login {
        /// Username (prompted when missing)
        username: Option<String>,

        /// Password (prompted when missing)
        #[arg(long, env = "CRM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List machines
    Machines {
        /// Use the public listing (no login needed)
        #[arg(long)]
        public: bool,

        /// Only machines of this CHC
        #[arg(long)]
        chc: Option<i64>,
    },

    /// List bookings of the logged-in CHC
    Bookings,

    /// Move a booking through its lifecycle
    BookingAction {
        /// Booking id
        id: i64,

        /// approve, reject, handover, complete or cancel
        action: BookingAction,

        /// Optional notes stored with the transition
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List usage records
    Usage {
        /// Only records of this machine
        #[arg(long)]
        machine: Option<i64>,
    },

    /// Search CHCs (public)
    Chcs {
        /// Search filter as key=value, repeatable
        #[arg(short, long = "filter", value_parser = parse_key_val)]
        filters: Vec<(String, String)>,
    },

    /// Show the dashboard for the logged-in role
    Dashboard,
}

/// Where session state lives
#[derive(Clone, Debug, PartialEq)]
pub enum StoreLocation {
    Memory,
    Sqlite(PathBuf),
}

/// Settings consumed by the API client
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub refresh_endpoint: String,
    pub connect_timeout: Option<u64>,
    pub request_timeout: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_endpoint: DEFAULT_REFRESH_ENDPOINT.to_string(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at the given base URL, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!(
                "Base URL must start with http:// or https://: {}",
                self.base_url
            );
        }

        if !self.refresh_endpoint.starts_with('/') {
            anyhow::bail!(
                "Refresh endpoint must be a path starting with '/': {}",
                self.refresh_endpoint
            );
        }

        Ok(())
    }
}

/// Full runtime configuration of the command line client
#[derive(Clone, Debug)]
pub struct Config {
    pub client: ClientConfig,
    pub store: StoreLocation,
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        let config = Self::from_args(&args)?;
        Ok((config, args.command))
    }

    /// Build configuration from parsed arguments
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let store = if args.ephemeral {
            StoreLocation::Memory
        } else {
            let path = match args.store {
                Some(ref s) => expand_tilde(s),
                None => default_store_path()
                    .context("Could not determine a data directory; use --store or CRM_SESSION_STORE")?,
            };
            StoreLocation::Sqlite(path)
        };

        let client = ClientConfig {
            base_url: args.base_url.trim_end_matches('/').to_string(),
            refresh_endpoint: args.refresh_endpoint.clone(),
            connect_timeout: args.connect_timeout,
            request_timeout: args.timeout,
        };
        client.validate()?;

        Ok(Self {
            client,
            store,
            log_level: args.log_level.clone(),
        })
    }
}

/// Default session database path under the user's data directory
fn default_store_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("crm-client").join("session.sqlite3"))
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a `key=value` filter
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{}', expected key=value", s))?;
    if key.is_empty() {
        return Err(format!("invalid filter '{}', empty key", s));
    }
    Ok((key.to_string(), value.to_string()))
}
