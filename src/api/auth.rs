use serde::Serialize;
use serde_json::{json, Value};

use crate::auth::{LoginRequest, SessionEndReason, TokenPair, REFRESH_TOKEN_KEY};
use crate::error::{ClientError, Result};
use crate::http_client::ApiClient;
use crate::models::{RegisterRequest, UserProfile};
use crate::request::{Method, RequestDescriptor};

impl ApiClient {
    /// Log in, store the token pair, then fetch and cache the profile.
    ///
    /// If the profile cannot be fetched the half-created session is ended
    /// and [`ClientError::ProfileUnavailable`] is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile> {
        let descriptor =
            RequestDescriptor::post("/auth/login/").json(&LoginRequest { username, password })?;

        let tokens: TokenPair = self.request_json(&descriptor).await?;
        let access = tokens
            .access
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::MalformedResponse(
                    "Login response does not contain an access token".to_string(),
                )
            })?;

        match tokens.refresh {
            Some(ref refresh) => self.session().set_tokens(&access, refresh),
            None => {
                tracing::warn!("Login response has no refresh token, session cannot be renewed");
                // A refresh token left by an earlier session must not pair with this one
                self.session().clear(&[REFRESH_TOKEN_KEY]);
                self.session().set_access_token(&access);
            }
        }

        let profile = match self.profile().await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(error = %e, "Logged in but profile fetch failed");
                self.end_session(SessionEndReason::LoginIncomplete);
                return Err(ClientError::ProfileUnavailable(Box::new(e)));
            }
        };

        self.session().set_role(&profile.role);
        self.session().set_profile(&profile);
        tracing::info!(username = %profile.username, role = %profile.role, "Logged in");

        Ok(profile)
    }

    /// Public self-registration
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value> {
        let descriptor = RequestDescriptor::post("/auth/register/").json(request)?;
        self.request(&descriptor).await
    }

    /// Current user's profile, straight from the backend
    pub async fn profile(&self) -> Result<UserProfile> {
        self.request_json(&RequestDescriptor::get("/auth/profile/").authenticated())
            .await
    }

    /// Update the current user's profile and refresh the cached copy
    pub async fn update_profile<T: Serialize + ?Sized>(&self, changes: &T) -> Result<UserProfile> {
        let descriptor = RequestDescriptor::put("/auth/profile/")
            .authenticated()
            .json(changes)?;
        let profile: UserProfile = self.request_json(&descriptor).await?;
        self.session().set_profile(&profile);
        Ok(profile)
    }

    pub async fn change_password(&self, new_password: &str) -> Result<Value> {
        let descriptor = RequestDescriptor::post("/auth/change_password/")
            .authenticated()
            .with_body(json!({ "new_password": new_password }));
        self.request(&descriptor).await
    }

    /// Create a CHC administrator (government admin only)
    pub async fn register_chc_admin(&self, request: &RegisterRequest) -> Result<Value> {
        let descriptor = RequestDescriptor::post("/auth/register_chc_admin/")
            .authenticated()
            .json(request)?;
        self.request(&descriptor).await
    }

    pub async fn list_chc_admins(&self) -> Result<Vec<UserProfile>> {
        self.fetch_all("/auth/admins/", true).await
    }

    pub async fn remove_chc_admin(&self, admin_id: i64) -> Result<Value> {
        let endpoint = format!("/auth/remove_chc_admin/{}/", admin_id);
        self.request(&RequestDescriptor::new(Method::Delete, endpoint).authenticated())
            .await
    }
}
