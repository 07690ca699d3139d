use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status in the lifecycle. Only `Approved` orders are ever persisted;
/// `Pending` exists purely in memory while the workflow is in flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
        }
    }
}

/// Incoming order request. Kid ticket fields are optional and default to
/// zero; everything else must be present in the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub event_id: i64,
    pub event_date: DateTime<Utc>,
    pub ticket_adult_price: i32,
    pub ticket_adult_quantity: i32,
    #[serde(default)]
    pub ticket_kid_price: i32,
    #[serde(default)]
    pub ticket_kid_quantity: i32,
    pub user_id: i64,
}

impl PlaceOrderRequest {
    /// Product-sum of price x quantity for both ticket classes.
    /// Computed once at order construction, never recomputed.
    pub fn total_price(&self) -> i64 {
        i64::from(self.ticket_adult_price) * i64::from(self.ticket_adult_quantity)
            + i64::from(self.ticket_kid_price) * i64::from(self.ticket_kid_quantity)
    }
}

/// The unit of work and the only entity this service writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub event_id: i64,
    pub event_date: DateTime<Utc>,
    pub ticket_adult_price: i32,
    pub ticket_adult_quantity: i32,
    pub ticket_kid_price: i32,
    pub ticket_kid_quantity: i32,
    pub total_price: i64,
    pub barcode: String,
    pub user_id: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(request: &PlaceOrderRequest, barcode: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            event_id: request.event_id,
            event_date: request.event_date,
            ticket_adult_price: request.ticket_adult_price,
            ticket_adult_quantity: request.ticket_adult_quantity,
            ticket_kid_price: request.ticket_kid_price,
            ticket_kid_quantity: request.ticket_kid_quantity,
            total_price: request.total_price(),
            barcode,
            user_id: request.user_id,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the order approved after the external approver confirmed it.
    pub fn approve(&mut self) {
        self.status = OrderStatus::Approved;
        self.updated_at = Utc::now();
    }
}

/// An issued ticket belonging to an order. No workflow behavior creates or
/// manipulates tickets; the type exists to mirror the persisted schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub ticket_type_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Ticket classification (adult, kid, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
