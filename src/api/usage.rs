use serde::Serialize;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::models::UsageRecord;
use crate::request::RequestDescriptor;

impl ApiClient {
    /// Every usage record matching the given filters (`machine`, `chc`, ...)
    pub async fn list_usage(&self, filters: &[(String, String)]) -> Result<Vec<UsageRecord>> {
        let descriptor = RequestDescriptor::get("/usage/")
            .authenticated()
            .query_pairs(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.fetch_all_with(descriptor).await
    }

    pub async fn create_usage<T: Serialize + ?Sized>(&self, record: &T) -> Result<UsageRecord> {
        let descriptor = RequestDescriptor::post("/usage/")
            .authenticated()
            .json(record)?;
        self.request_json(&descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{LoggingHandler, SessionStore};
    use crate::config::ClientConfig;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        let config = ClientConfig::with_base_url(server.url());
        let session = SessionStore::in_memory();
        session.set_tokens("a", "r");
        ApiClient::new(session, Arc::new(LoggingHandler), &config).unwrap()
    }

    #[tokio::test]
    async fn test_list_usage_with_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/usage/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("chc".into(), "3".into()),
                Matcher::UrlEncoded("nopage".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let records = client
            .list_usage(&[("chc".to_string(), "3".to_string())])
            .await
            .unwrap();

        assert!(records.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_usage() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/usage/")
            .match_body(Matcher::PartialJson(json!({"machine": 12})))
            .with_status(201)
            .with_body(
                r#"{
                    "id": 7,
                    "machine": 12,
                    "farmer_name": "Harjit",
                    "farmer_contact": "9876500000",
                    "usage_date": "2025-11-02",
                    "start_time": "09:00:00",
                    "end_time": "13:30:00"
                }"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let record = client
            .create_usage(&json!({
                "machine": 12,
                "farmer_name": "Harjit",
                "farmer_contact": "9876500000",
                "usage_date": "2025-11-02",
                "start_time": "09:00",
                "end_time": "13:30"
            }))
            .await
            .unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.booking, None);
    }
}
