use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Order;

/// Error string the booking API uses to report a barcode collision.
pub const BARCODE_TAKEN: &str = "barcode already exists";

/// Message the approval API returns when it confirms an order.
pub const APPROVAL_CONFIRMED: &str = "order successfully approved";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The external API was unreachable or the request never completed.
    #[error("gateway request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The external API answered with something that is not JSON.
    #[error("gateway returned a malformed response: {0}")]
    Malformed(String),
}

/// Wire payload for the booking API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub event_id: i64,
    pub event_date: DateTime<Utc>,
    pub ticket_adult_price: i32,
    pub ticket_adult_quantity: i32,
    pub ticket_kid_price: i32,
    pub ticket_kid_quantity: i32,
    pub barcode: String,
}

impl BookingRequest {
    pub fn from_order(order: &Order) -> Self {
        Self {
            event_id: order.event_id,
            event_date: order.event_date,
            ticket_adult_price: order.ticket_adult_price,
            ticket_adult_quantity: order.ticket_adult_quantity,
            ticket_kid_price: order.ticket_kid_price,
            ticket_kid_quantity: order.ticket_kid_quantity,
            barcode: order.barcode.clone(),
        }
    }
}

/// What the booking API said about one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingReply {
    /// Anything other than a collision counts as booked.
    Booked,
    /// The barcode is already taken on the booking side; the caller
    /// regenerates and retries.
    BarcodeTaken,
}

/// What the approval API said. A rejection carries the reason code from the
/// response body (empty when the body had no message field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalReply {
    Approved,
    Rejected(String),
}

#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn book(&self, request: &BookingRequest) -> Result<BookingReply, GatewayError>;
}

#[async_trait]
pub trait ApprovalGateway: Send + Sync {
    async fn approve(&self, barcode: &str) -> Result<ApprovalReply, GatewayError>;
}
