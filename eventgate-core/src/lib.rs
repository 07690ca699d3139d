pub mod gateway;
pub mod models;
pub mod repository;

pub use gateway::{
    ApprovalGateway, ApprovalReply, BookingGateway, BookingReply, BookingRequest, GatewayError,
};
pub use models::{Order, OrderStatus, PlaceOrderRequest, Ticket, TicketType};
pub use repository::{OrderRepository, RepositoryError};
