use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{self, SessionEndReason, SessionExpiredHandler, SessionStore};
use crate::config::ClientConfig;
use crate::error::{error_message_from_body, ClientError, GENERIC_ERROR_MESSAGE};
use crate::models::{flatten_records, Page};
use crate::request::{Method, RequestDescriptor};

/// Query flag that makes list endpoints return every record as a bare array
pub const NO_PAGINATION_PARAM: (&str, &str) = ("nopage", "true");

/// HTTP client for the CRM backend with transparent token refresh
///
/// Cloning is cheap and clones share the session and connection state.
#[derive(Clone)]
pub struct ApiClient {
    /// Shared HTTP client
    client: Client,

    /// Session state (tokens, role, profile)
    session: SessionStore,

    /// Notified whenever the session ends
    handler: Arc<dyn SessionExpiredHandler>,

    /// Base URL without trailing slash
    base_url: String,

    /// Parsed base URL, used for origin checks
    base: Url,

    /// Absolute refresh endpoint
    refresh_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        session: SessionStore,
        handler: Arc<dyn SessionExpiredHandler>,
        config: &ClientConfig,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.request_timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .with_context(|| format!("Invalid base URL: {}", base_url))?;
        let refresh_url = format!("{}{}", base_url, config.refresh_endpoint);

        Ok(Self {
            client,
            session,
            handler,
            base_url,
            base,
            refresh_url,
        })
    }

    /// Session state used by this client
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute one logical call.
    ///
    /// A 401 on an authenticated call triggers a single token refresh and
    /// replay. If the session cannot be recovered it is ended and
    /// [`ClientError::SessionExpired`] is returned.
    pub async fn request(&self, descriptor: &RequestDescriptor) -> Result<Value, ClientError> {
        self.request_internal(descriptor, true).await
    }

    /// Execute a call without the refresh-and-replay step.
    /// A 401 is returned to the caller as [`ClientError::Api`].
    pub async fn request_no_retry(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<Value, ClientError> {
        self.request_internal(descriptor, false).await
    }

    /// Execute a call and decode the body into `T`
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ClientError> {
        let value = self.request(descriptor).await?;
        decode(descriptor.endpoint(), value)
    }

    /// Fetch one page of a list endpoint, keeping `next`/`count`
    pub async fn request_page<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<Page<T>, ClientError> {
        let value = self.request(descriptor).await?;
        Page::from_value(value)
    }

    /// Fetch every record of a list endpoint in one call.
    ///
    /// Accepts a relative endpoint or an absolute URL under the base URL.
    /// The result is always a plain sequence, never the envelope.
    pub async fn fetch_all_pages(
        &self,
        endpoint: &str,
        requires_auth: bool,
        method: Method,
    ) -> Result<Vec<Value>, ClientError> {
        let relative = if endpoint.contains("://") {
            self.relative_to_base(endpoint)
                .ok_or_else(|| outside_base_url(endpoint))?
        } else {
            endpoint.to_string()
        };
        let descriptor = RequestDescriptor::new(method, relative).with_auth(requires_auth);
        self.fetch_records(descriptor).await
    }

    /// Typed variant of [`fetch_all_pages`](Self::fetch_all_pages) for GET listings
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        requires_auth: bool,
    ) -> Result<Vec<T>, ClientError> {
        let descriptor = RequestDescriptor::get(endpoint).with_auth(requires_auth);
        self.fetch_all_with(descriptor).await
    }

    /// Fetch every record for a prepared descriptor (filters as query params)
    pub async fn fetch_all_with<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<Vec<T>, ClientError> {
        let endpoint = descriptor.endpoint().to_string();
        self.fetch_records(descriptor)
            .await?
            .into_iter()
            .map(|record| decode(&endpoint, record))
            .collect()
    }

    async fn fetch_records(&self, descriptor: RequestDescriptor) -> Result<Vec<Value>, ClientError> {
        let descriptor = descriptor.query(NO_PAGINATION_PARAM.0, NO_PAGINATION_PARAM.1);
        let data = self.request(&descriptor).await?;
        Ok(flatten_records(data))
    }

    /// Exchange the refresh token for a new access token.
    /// Reports failure only; does not end the session.
    pub async fn refresh_access_token(&self) -> Result<String, ClientError> {
        auth::refresh_access_token(&self.client, &self.refresh_url, &self.session).await
    }

    /// Clear the session and notify the handler
    pub fn logout(&self) {
        self.end_session(SessionEndReason::LoggedOut);
    }

    /// The only place session state is cleared
    pub(crate) fn end_session(&self, reason: SessionEndReason) {
        self.session.clear_session();
        self.handler.on_session_end(reason);
    }

    /// Internal method that handles the refresh-and-replay logic
    async fn request_internal(
        &self,
        descriptor: &RequestDescriptor,
        allow_retry: bool,
    ) -> Result<Value, ClientError> {
        let endpoint = descriptor.endpoint();
        let url = self.resolve_url(endpoint)?;
        let mut allow_retry = allow_retry;
        let mut refreshed = false;

        tracing::debug!(
            method = %descriptor.method(),
            url = %url,
            authenticated = descriptor.requires_auth(),
            "Sending API request"
        );

        loop {
            // Rebuilt on every attempt so a refreshed token is picked up
            let request = self.build_request(&url, descriptor)?;

            let response = match self.client.execute(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(
                        error_kind = error_kind(&e),
                        error = %e,
                        endpoint = %endpoint,
                        "HTTP request failed"
                    );
                    return Err(ClientError::Network(e));
                }
            };

            let status = response.status();
            tracing::debug!(status = %status, endpoint = %endpoint, "Received API response");

            if status == StatusCode::UNAUTHORIZED && descriptor.requires_auth() {
                if allow_retry {
                    tracing::warn!(endpoint = %endpoint, "Access token expired, attempting refresh...");

                    match self.refresh_access_token().await {
                        Ok(_) => {
                            allow_retry = false;
                            refreshed = true;
                            continue;
                        }
                        Err(e) => {
                            tracing::error!(
                                endpoint = %endpoint,
                                error = %e,
                                "Refresh failed, ending session"
                            );
                            self.end_session(SessionEndReason::Expired);
                            return Err(ClientError::SessionExpired {
                                reason: e.to_string(),
                            });
                        }
                    }
                }

                if refreshed {
                    tracing::error!(
                        endpoint = %endpoint,
                        "Refreshed access token was rejected, ending session"
                    );
                    self.end_session(SessionEndReason::Expired);
                    return Err(ClientError::SessionExpired {
                        reason: "refreshed access token was rejected".to_string(),
                    });
                }
            }

            return self.handle_response(endpoint, response).await;
        }
    }

    /// Turn a relative endpoint into an absolute URL under the base URL
    fn resolve_url(&self, endpoint: &str) -> Result<String, ClientError> {
        if endpoint.contains("://") {
            let relative = self
                .relative_to_base(endpoint)
                .ok_or_else(|| outside_base_url(endpoint))?;
            return Ok(format!("{}{}", self.base_url, relative));
        }

        if endpoint.starts_with('/') {
            Ok(format!("{}{}", self.base_url, endpoint))
        } else {
            Ok(format!("{}/{}", self.base_url, endpoint))
        }
    }

    /// Path and query of an absolute URL relative to the base URL.
    ///
    /// `None` unless scheme, host and port match the base and the path
    /// continues the base path at a `/` boundary.
    fn relative_to_base(&self, endpoint: &str) -> Option<String> {
        let url = Url::parse(endpoint).ok()?;
        if url.scheme() != self.base.scheme()
            || url.host_str() != self.base.host_str()
            || url.port_or_known_default() != self.base.port_or_known_default()
        {
            return None;
        }

        let base_path = self.base.path().trim_end_matches('/');
        let rest = url.path().strip_prefix(base_path)?;
        if !(rest.is_empty() || rest.starts_with('/')) {
            return None;
        }

        let mut relative = if rest.is_empty() { "/" } else { rest }.to_string();
        if let Some(query) = url.query() {
            relative.push('?');
            relative.push_str(query);
        }
        Some(relative)
    }

    fn build_request(
        &self,
        url: &str,
        descriptor: &RequestDescriptor,
    ) -> Result<reqwest::Request, ClientError> {
        let mut builder = self.client.request(descriptor.method().into(), url);

        if !descriptor.params().is_empty() {
            builder = builder.query(descriptor.params());
        }

        if descriptor.requires_auth() {
            if let Some(token) = self.session.access_token() {
                builder = builder.bearer_auth(token);
            }
        }

        // Content-Type only travels with a body
        if let Some(body) = descriptor.body() {
            builder = builder.json(body);
        }

        builder
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))
    }

    async fn handle_response(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<Value, ClientError> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(success_marker());
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(endpoint = %endpoint, error = %e, "Failed to read response body");
            ClientError::Network(e)
        })?;
        let parsed = serde_json::from_slice::<Value>(&bytes);

        if !status.is_success() {
            let message = match parsed {
                Ok(ref body) => error_message_from_body(body),
                Err(_) => GENERIC_ERROR_MESSAGE.to_string(),
            };

            tracing::error!(
                status = status.as_u16(),
                endpoint = %endpoint,
                message = %message,
                "API request failed with error response"
            );

            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parsed.map_err(|e| {
            tracing::error!(
                endpoint = %endpoint,
                error = %e,
                body = %String::from_utf8_lossy(&bytes),
                "Response body is not valid JSON"
            );
            ClientError::MalformedResponse(format!("Invalid JSON from {}: {}", endpoint, e))
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("refresh_url", &self.refresh_url)
            .field("session", &self.session)
            .finish()
    }
}

/// Body returned for 204 No Content
pub fn success_marker() -> Value {
    serde_json::json!({ "success": true })
}

fn outside_base_url(endpoint: &str) -> ClientError {
    ClientError::InvalidRequest(format!(
        "Endpoint is outside of the API base URL: {}",
        endpoint
    ))
}

fn decode<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(endpoint = %endpoint, error = %e, "Unexpected response shape");
        ClientError::MalformedResponse(format!("Unexpected response from {}: {}", endpoint, e))
    })
}

/// Categorize a transport error for logging
fn error_kind(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection_failed"
    } else if e.is_request() {
        "request_error"
    } else if e.is_body() {
        "body_error"
    } else if e.is_decode() {
        "decode_error"
    } else {
        "unknown"
    }
}
