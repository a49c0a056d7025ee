use crate::domain::models::{booking::Booking, service::Service};
use crate::domain::ports::NotificationService;
use crate::domain::services::calendar::generate_ics;
use crate::error::AppError;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::error;

/// Posts booking events to the external notification relay. Best-effort:
/// callers run this in a detached task and only log failures.
pub struct HttpNotifier {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotifier {
    pub fn new(api_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, api_url, api_key }
    }

    async fn post_event(&self, event: &str, service: &Service, booking: &Booking) -> Result<(), AppError> {
        let ics = generate_ics(service, booking);

        let payload = NotificationPayload {
            event: event.to_string(),
            service_id: service.id.clone(),
            service_name: service.name.clone(),
            booking: booking.clone(),
            ics_base64: general_purpose::STANDARD.encode(ics.as_bytes()),
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Notification service connection error: {}", e);
                AppError::Internal
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            error!("Notification service failed. Status: {}, Body: {}", status, text);
            return Err(AppError::Internal);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct NotificationPayload {
    event: String,
    service_id: String,
    service_name: String,
    booking: Booking,
    ics_base64: String,
}

#[async_trait]
impl NotificationService for HttpNotifier {
    async fn booking_created(&self, service: &Service, booking: &Booking) -> Result<(), AppError> {
        self.post_event("booking.created", service, booking).await
    }

    async fn booking_modified(&self, service: &Service, booking: &Booking) -> Result<(), AppError> {
        self.post_event("booking.modified", service, booking).await
    }

    async fn booking_cancelled(&self, service: &Service, booking: &Booking) -> Result<(), AppError> {
        self.post_event("booking.cancelled", service, booking).await
    }
}
