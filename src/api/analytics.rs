// Analytics payloads change with the dashboards, so they stay raw JSON

use serde_json::Value;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::request::RequestDescriptor;

impl ApiClient {
    pub async fn govt_dashboard(&self) -> Result<Value> {
        self.analytics("/analytics/govt/dashboard/").await
    }

    pub async fn govt_chc_analytics(&self, chc_id: i64) -> Result<Value> {
        self.analytics(&format!("/analytics/govt/chc/{}/", chc_id))
            .await
    }

    pub async fn govt_reports(&self) -> Result<Value> {
        self.analytics("/analytics/govt/reports/").await
    }

    pub async fn chc_dashboard(&self) -> Result<Value> {
        self.analytics("/analytics/chc/dashboard/").await
    }

    pub async fn machine_analytics(&self) -> Result<Value> {
        self.analytics("/analytics/machines/").await
    }

    async fn analytics(&self, endpoint: &str) -> Result<Value> {
        self.request(&RequestDescriptor::get(endpoint).authenticated())
            .await
    }
}
