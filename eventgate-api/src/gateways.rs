use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use eventgate_core::gateway::{
    ApprovalGateway, ApprovalReply, BookingGateway, BookingReply, BookingRequest, GatewayError,
    APPROVAL_CONFIRMED, BARCODE_TAKEN,
};

/// Shared outbound client. The timeout is the only deadline the workflow
/// has against a hung external API.
pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

fn transport(e: reqwest::Error) -> GatewayError {
    GatewayError::Transport(Box::new(e))
}

pub struct HttpBookingGateway {
    client: Client,
    endpoint: String,
}

impl HttpBookingGateway {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn book(&self, request: &BookingRequest) -> Result<BookingReply, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        // The booking API reports collisions in the body; every other body
        // (error statuses included) counts as booked.
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        if body.get("error").and_then(Value::as_str) == Some(BARCODE_TAKEN) {
            debug!("Booking API reported barcode collision for {}", request.barcode);
            return Ok(BookingReply::BarcodeTaken);
        }
        Ok(BookingReply::Booked)
    }
}

pub struct HttpApprovalGateway {
    client: Client,
    endpoint: String,
}

impl HttpApprovalGateway {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ApprovalGateway for HttpApprovalGateway {
    async fn approve(&self, barcode: &str) -> Result<ApprovalReply, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "barcode": barcode }))
            .send()
            .await
            .map_err(transport)?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        match body.get("message").and_then(Value::as_str) {
            Some(APPROVAL_CONFIRMED) => Ok(ApprovalReply::Approved),
            Some(reason) => Ok(ApprovalReply::Rejected(reason.to_string())),
            None => Ok(ApprovalReply::Rejected(String::new())),
        }
    }
}
