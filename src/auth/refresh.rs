// Token refresh logic

use reqwest::Client;

use super::manager::SessionStore;
use super::types::{RefreshRequest, RefreshResponse};
use crate::error::{error_message_from_body, ClientError};

/// Exchange the stored refresh token for a new access token.
///
/// On success the new access token is written to the session and returned.
/// The refresh token itself is not rotated. Failures are reported only;
/// ending the session is the caller's decision.
pub async fn refresh_access_token(
    client: &Client,
    refresh_url: &str,
    session: &SessionStore,
) -> Result<String, ClientError> {
    let refresh_token = session.refresh_token().ok_or(ClientError::NoRefreshToken)?;

    tracing::info!(url = %refresh_url, "Refreshing access token...");

    let response = client
        .post(refresh_url)
        .json(&RefreshRequest {
            refresh: &refresh_token,
        })
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, url = %refresh_url, "Failed to send refresh request");
            ClientError::Network(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&error_text)
            .map(|body| error_message_from_body(&body))
            .unwrap_or_else(|_| error_text.clone());

        tracing::error!(
            status = status.as_u16(),
            body = %error_text,
            "Token refresh rejected"
        );

        return Err(ClientError::RefreshRejected {
            status: status.as_u16(),
            message,
        });
    }

    let data: RefreshResponse = response.json().await.map_err(|e| {
        ClientError::MalformedResponse(format!("Failed to parse refresh response: {}", e))
    })?;

    if data.access.is_empty() {
        return Err(ClientError::MalformedResponse(
            "Refresh response does not contain an access token".to_string(),
        ));
    }

    session.set_access_token(&data.access);
    tracing::info!("Access token refreshed");

    Ok(data.access)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_refresh_without_token_makes_no_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/token/refresh/")
            .expect(0)
            .create_async()
            .await;

        let session = SessionStore::in_memory();
        session.set_access_token("stale");

        let url = format!("{}/auth/token/refresh/", server.url());
        let err = refresh_access_token(&Client::new(), &url, &session)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::NoRefreshToken));
        mock.assert_async().await;
        // Failure does not touch session state
        assert_eq!(session.access_token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_refresh_stores_new_access_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/token/refresh/")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"refresh": "refresh-1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "access-2"}"#)
            .create_async()
            .await;

        let session = SessionStore::in_memory();
        session.set_tokens("access-1", "refresh-1");

        let url = format!("{}/auth/token/refresh/", server.url());
        let token = refresh_access_token(&Client::new(), &url, &session)
            .await
            .unwrap();

        assert_eq!(token, "access-2");
        assert_eq!(session.access_token().as_deref(), Some("access-2"));
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/token/refresh/")
            .with_status(401)
            .with_body(r#"{"detail": "Token is invalid or expired", "code": "token_not_valid"}"#)
            .create_async()
            .await;

        let session = SessionStore::in_memory();
        session.set_tokens("access-1", "refresh-1");

        let url = format!("{}/auth/token/refresh/", server.url());
        let err = refresh_access_token(&Client::new(), &url, &session)
            .await
            .unwrap_err();

        match err {
            ClientError::RefreshRejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Token is invalid or expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Reporting only; nothing cleared here
        assert_eq!(session.refresh_token().as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_refresh_response_without_access_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_body(r#"{"refresh": "rotated"}"#)
            .create_async()
            .await;

        let session = SessionStore::in_memory();
        session.set_tokens("access-1", "refresh-1");

        let url = format!("{}/auth/token/refresh/", server.url());
        let err = refresh_access_token(&Client::new(), &url, &session)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::MalformedResponse(_)));
        assert_eq!(session.access_token().as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_refresh_twice_keeps_latest_token() {
        let mut server = mockito::Server::new_async().await;
        let first_mock = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access": "access-a"}"#)
            .create_async()
            .await;

        let session = SessionStore::in_memory();
        session.set_tokens("access-0", "refresh-1");
        let url = format!("{}/auth/token/refresh/", server.url());
        let client = Client::new();

        let first = refresh_access_token(&client, &url, &session).await.unwrap();
        first_mock.remove_async().await;

        server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_body(r#"{"access": "access-b"}"#)
            .create_async()
            .await;

        let second = refresh_access_token(&client, &url, &session).await.unwrap();

        assert_eq!(first, "access-a");
        assert_eq!(second, "access-b");
        assert_eq!(session.access_token().as_deref(), Some("access-b"));
    }
}
