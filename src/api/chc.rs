use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::models::Chc;
use crate::request::RequestDescriptor;

impl ApiClient {
    /// Public CHC search, filters such as `state`, `district` or `search`
    pub async fn search_chcs(&self, filters: &[(String, String)]) -> Result<Vec<Chc>> {
        let descriptor = RequestDescriptor::get("/chc/public/search/")
            .query_pairs(filters.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.fetch_all_with(descriptor).await
    }

    pub async fn list_chcs(&self) -> Result<Vec<Chc>> {
        self.fetch_all("/chc/", true).await
    }

    pub async fn get_chc(&self, id: i64) -> Result<Chc> {
        self.request_json(&RequestDescriptor::get(format!("/chc/{}/", id)).authenticated())
            .await
    }

    pub async fn create_chc<T: Serialize + ?Sized>(&self, chc: &T) -> Result<Chc> {
        let descriptor = RequestDescriptor::post("/chc/").authenticated().json(chc)?;
        self.request_json(&descriptor).await
    }

    pub async fn update_chc<T: Serialize + ?Sized>(&self, id: i64, changes: &T) -> Result<Chc> {
        let descriptor = RequestDescriptor::patch(format!("/chc/{}/", id))
            .authenticated()
            .json(changes)?;
        self.request_json(&descriptor).await
    }

    pub async fn delete_chc(&self, id: i64) -> Result<Value> {
        self.request(&RequestDescriptor::delete(format!("/chc/{}/", id)).authenticated())
            .await
    }

    /// Make an existing CHC admin responsible for a center
    pub async fn assign_admin(&self, chc_id: i64, admin_id: i64) -> Result<Value> {
        let descriptor = RequestDescriptor::post(format!("/chc/{}/assign_admin/", chc_id))
            .authenticated()
            .with_body(json!({ "admin_id": admin_id }));
        self.request(&descriptor).await
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{LoggingHandler, SessionStore};
    use crate::config::ClientConfig;
    use crate::http_client::ApiClient;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;

    const CHC: &str = r#"{
        "id": 3,
        "chc_name": "Ludhiana CHC",
        "state": "Punjab",
        "district": "Ludhiana",
        "total_machines": 14
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        let config = ClientConfig::with_base_url(server.url());
        let session = SessionStore::in_memory();
        session.set_tokens("a", "r");
        ApiClient::new(session, Arc::new(LoggingHandler), &config).unwrap()
    }

    #[tokio::test]
    async fn test_search_is_public_and_encodes_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/chc/public/search/")
            .match_header("authorization", Matcher::Missing)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("district".into(), "Fatehgarh Sahib".into()),
                Matcher::UrlEncoded("nopage".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(format!("[{}]", CHC))
            .create_async()
            .await;

        let client = client_for(&server);
        let chcs = client
            .search_chcs(&[("district".to_string(), "Fatehgarh Sahib".to_string())])
            .await
            .unwrap();

        assert_eq!(chcs.len(), 1);
        assert!(chcs[0].is_active);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_assign_admin_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chc/3/assign_admin/")
            .match_header("authorization", "Bearer a")
            .match_body(Matcher::Json(json!({"admin_id": 9})))
            .with_status(200)
            .with_body(r#"{"message": "Admin assigned"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.assign_admin(3, 9).await.unwrap();

        assert_eq!(result["message"], "Admin assigned");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chc_crud() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chc/")
            .with_status(201)
            .with_body(CHC)
            .create_async()
            .await;
        server
            .mock("GET", "/chc/3/")
            .with_status(200)
            .with_body(CHC)
            .create_async()
            .await;
        server
            .mock("PATCH", "/chc/3/")
            .match_body(Matcher::Json(json!({"is_active": false})))
            .with_status(200)
            .with_body(CHC.replace("\"total_machines\": 14", "\"total_machines\": 14, \"is_active\": false"))
            .create_async()
            .await;
        server
            .mock("DELETE", "/chc/3/")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server);
        let created = client
            .create_chc(&json!({"chc_name": "Ludhiana CHC", "state": "Punjab", "district": "Ludhiana"}))
            .await
            .unwrap();
        let fetched = client.get_chc(3).await.unwrap();
        let updated = client.update_chc(3, &json!({"is_active": false})).await.unwrap();
        let deleted = client.delete_chc(3).await.unwrap();

        assert_eq!(created, fetched);
        assert!(!updated.is_active);
        assert_eq!(deleted["success"], true);
    }
}
