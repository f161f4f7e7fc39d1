use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::models::{Machine, UsageRecord};
use crate::request::RequestDescriptor;

impl ApiClient {
    /// Every machine visible to the caller.
    ///
    /// `public` uses the unauthenticated farmer listing. `chc_id` narrows
    /// the result to one center.
    pub async fn list_machines(&self, public: bool, chc_id: Option<i64>) -> Result<Vec<Machine>> {
        let endpoint = if public { "/machines/public/" } else { "/machines/" };
        let mut descriptor = RequestDescriptor::get(endpoint).with_auth(!public);
        if let Some(id) = chc_id {
            descriptor = descriptor.query("chc", id);
        }
        self.fetch_all_with(descriptor).await
    }

    pub async fn get_machine(&self, id: i64) -> Result<Machine> {
        self.request_json(&RequestDescriptor::get(format!("/machines/{}/", id)).authenticated())
            .await
    }

    pub async fn get_public_machine(&self, id: i64) -> Result<Machine> {
        self.request_json(&RequestDescriptor::get(format!("/machines/public/{}/", id)))
            .await
    }

    pub async fn create_machine<T: Serialize + ?Sized>(&self, machine: &T) -> Result<Machine> {
        let descriptor = RequestDescriptor::post("/machines/")
            .authenticated()
            .json(machine)?;
        self.request_json(&descriptor).await
    }

    /// Partial update
    pub async fn update_machine<T: Serialize + ?Sized>(
        &self,
        id: i64,
        changes: &T,
    ) -> Result<Machine> {
        let descriptor = RequestDescriptor::patch(format!("/machines/{}/", id))
            .authenticated()
            .json(changes)?;
        self.request_json(&descriptor).await
    }

    pub async fn delete_machine(&self, id: i64) -> Result<Value> {
        self.request(&RequestDescriptor::delete(format!("/machines/{}/", id)).authenticated())
            .await
    }

    /// Usage history of one machine
    pub async fn machine_usage(&self, id: i64) -> Result<Vec<UsageRecord>> {
        let descriptor = RequestDescriptor::get("/usage/")
            .authenticated()
            .query("machine", id);
        self.fetch_all_with(descriptor).await
    }

    /// Date ranges already booked for a machine (public)
    pub async fn machine_booked_dates(&self, id: i64) -> Result<Value> {
        self.request(&RequestDescriptor::get(format!(
            "/bookings/public/machine/{}/dates/",
            id
        )))
        .await
    }
}
