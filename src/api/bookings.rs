use serde_json::Value;

use crate::error::Result;
use crate::http_client::ApiClient;
use crate::models::booking::BookingActionRequest;
use crate::models::{Booking, BookingAction, NewBooking};
use crate::request::RequestDescriptor;

impl ApiClient {
    /// Farmer booking request, no login needed
    pub async fn create_public_booking(&self, booking: &NewBooking) -> Result<Booking> {
        let descriptor = RequestDescriptor::post("/bookings/public/create/").json(booking)?;
        self.request_json(&descriptor).await
    }

    /// Status lookup by public booking id (e.g. `BKG-7Q2X9A`)
    pub async fn public_booking_status(&self, booking_id: &str) -> Result<Value> {
        self.request(&RequestDescriptor::get(format!(
            "/bookings/public/{}/status/",
            booking_id
        )))
        .await
    }

    /// Every booking of the logged-in CHC
    pub async fn list_chc_bookings(&self) -> Result<Vec<Booking>> {
        self.fetch_all("/bookings/chc/", true).await
    }

    /// Move a booking through its lifecycle
    pub async fn update_booking_status(
        &self,
        id: i64,
        action: BookingAction,
        notes: &str,
    ) -> Result<Value> {
        let descriptor = RequestDescriptor::patch(format!("/bookings/chc/{}/action/", id))
            .authenticated()
            .json(&BookingActionRequest { action, notes })?;

        let result = self.request(&descriptor).await?;
        tracing::info!(booking = id, action = %action, "Booking updated");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::{LoggingHandler, SessionStore};
    use crate::config::ClientConfig;
    use crate::http_client::ApiClient;
    use crate::models::{BookingAction, BookingStatus, NewBooking};
    use chrono::NaiveDate;
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::Arc;

    const BOOKING: &str = r#"{
        "id": 41,
        "booking_id": "BKG-7Q2X9A",
        "chc": 3,
        "machine": 12,
        "start_date": "2025-11-10",
        "end_date": "2025-11-12",
        "status": "Pending",
        "farmer_name": "Harjit Singh",
        "farmer_contact": "9876500000"
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        let config = ClientConfig::with_base_url(server.url());
        let session = SessionStore::in_memory();
        session.set_tokens("a", "r");
        ApiClient::new(session, Arc::new(LoggingHandler), &config).unwrap()
    }

    #[tokio::test]
    async fn test_create_public_booking() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bookings/public/create/")
            .match_header("authorization", Matcher::Missing)
            .match_body(Matcher::PartialJson(json!({
                "machine": 12,
                "start_date": "2025-11-10",
                "end_date": "2025-11-12"
            })))
            .with_status(201)
            .with_body(BOOKING)
            .create_async()
            .await;

        let client = client_for(&server);
        let booking = client
            .create_public_booking(&NewBooking {
                machine: 12,
                start_date: NaiveDate::from_ymd_opt(2025, 11, 10).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 11, 12).unwrap(),
                farmer_name: "Harjit Singh".to_string(),
                farmer_contact: "9876500000".to_string(),
                farmer_email: "harjit@example.com".to_string(),
                farmer_aadhar: "123412341234".to_string(),
                purpose: None,
                field_area: Some("4.5".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.duration_days(), 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_booking_status_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/bookings/chc/41/action/")
            .match_header("authorization", "Bearer a")
            .match_body(Matcher::Json(json!({"action": "approve", "notes": "ok"})))
            .with_status(200)
            .with_body(r#"{"status": "Approved"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client
            .update_booking_status(41, BookingAction::Approve, "ok")
            .await
            .unwrap();

        assert_eq!(result["status"], "Approved");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_chc_bookings_and_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bookings/chc/")
            .match_query(Matcher::UrlEncoded("nopage".into(), "true".into()))
            .with_status(200)
            .with_body(format!("[{}]", BOOKING))
            .create_async()
            .await;
        server
            .mock("GET", "/bookings/public/BKG-7Q2X9A/status/")
            .with_status(200)
            .with_body(r#"{"booking_id": "BKG-7Q2X9A", "status": "Pending"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let bookings = client.list_chc_bookings().await.unwrap();
        let status = client.public_booking_status("BKG-7Q2X9A").await.unwrap();

        assert_eq!(bookings[0].booking_id, "BKG-7Q2X9A");
        assert_eq!(status["status"], "Pending");
    }
}
