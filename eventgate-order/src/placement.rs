use std::sync::Arc;

use thiserror::Error;

use eventgate_core::gateway::{
    ApprovalGateway, ApprovalReply, BookingGateway, BookingReply, BookingRequest, GatewayError,
};
use eventgate_core::models::{Order, PlaceOrderRequest};
use eventgate_core::repository::{OrderRepository, RepositoryError};

use crate::barcode::BarcodeSource;

/// How many booking tries a single placement gets before giving up on
/// consecutive barcode collisions.
pub const MAX_BOOKING_ATTEMPTS: u32 = 3;

/// Rejection message when booking exhausts its collision retries.
pub const ORDER_CANCELLED: &str = "Order cancelled";

/// Fallback when the approval API rejects with a reason we do not know.
pub const APPROVAL_REJECTED: &str = "Approval rejected";

#[derive(Debug, Error)]
pub enum PlacementError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Terminal outcome of one placement run. Errors (transport, storage) are
/// reported separately through [`PlacementError`].
#[derive(Debug, Clone)]
pub enum PlacementOutcome {
    /// Booking and approval both succeeded; the order is durably stored.
    Approved { order: Order },
    /// Booking or approval declined; nothing was stored.
    Rejected { message: String },
}

/// Map an approval rejection reason code to its customer-facing message.
/// Unknown codes collapse into a generic rejection.
pub fn rejection_message(reason: &str) -> &'static str {
    match reason {
        "event cancelled" => "Event was cancelled",
        "no tickets" => "No tickets available",
        "no seats" => "No seats available",
        "fan removed" => "Fan was removed",
        _ => APPROVAL_REJECTED,
    }
}

/// Orchestrates booking -> approval -> persistence for one order request.
pub struct PlacementWorkflow {
    repository: Arc<dyn OrderRepository>,
    booking: Arc<dyn BookingGateway>,
    approval: Arc<dyn ApprovalGateway>,
    barcodes: Arc<dyn BarcodeSource>,
}

impl PlacementWorkflow {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        booking: Arc<dyn BookingGateway>,
        approval: Arc<dyn ApprovalGateway>,
        barcodes: Arc<dyn BarcodeSource>,
    ) -> Self {
        Self {
            repository,
            booking,
            approval,
            barcodes,
        }
    }

    /// Run the whole placement. Persists exactly one row on full success and
    /// nothing otherwise; every failure short-circuits the remaining steps.
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
    ) -> Result<PlacementOutcome, PlacementError> {
        let barcode = self.fresh_barcode().await?;
        let mut order = Order::new(&request, barcode);

        if !self.book_order(&mut order).await? {
            return Ok(PlacementOutcome::Rejected {
                message: ORDER_CANCELLED.to_string(),
            });
        }

        match self.approval.approve(&order.barcode).await? {
            ApprovalReply::Approved => {
                order.approve();
                self.repository.insert_order(&order).await?;
                Ok(PlacementOutcome::Approved { order })
            }
            ApprovalReply::Rejected(reason) => Ok(PlacementOutcome::Rejected {
                message: rejection_message(&reason).to_string(),
            }),
        }
    }

    /// Draw candidates until one is not already taken by a persisted order.
    /// The store's unique constraint remains the authority at write time.
    async fn fresh_barcode(&self) -> Result<String, PlacementError> {
        loop {
            let candidate = self.barcodes.draw();
            if !self.repository.barcode_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
    }

    /// Try the booking API, regenerating the barcode on each collision.
    /// Returns false once the attempt budget is spent on collisions; any
    /// non-collision reply is terminal success for this call.
    async fn book_order(&self, order: &mut Order) -> Result<bool, PlacementError> {
        for _ in 0..MAX_BOOKING_ATTEMPTS {
            match self.booking.book(&BookingRequest::from_order(order)).await? {
                BookingReply::Booked => return Ok(true),
                BookingReply::BarcodeTaken => {
                    order.barcode = self.fresh_barcode().await?;
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use eventgate_core::models::OrderStatus;

    struct MemoryOrders {
        rows: Mutex<Vec<Order>>,
    }

    impl MemoryOrders {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(Vec::new()),
            })
        }

        fn seeded(barcode: &str) -> Arc<Self> {
            let repo = Self::new();
            let request = sample_request();
            let mut order = Order::new(&request, barcode.to_string());
            order.approve();
            repo.rows.lock().unwrap().push(order);
            repo
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl OrderRepository for MemoryOrders {
        async fn insert_order(&self, order: &Order) -> Result<(), RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|o| o.barcode == order.barcode) {
                return Err(RepositoryError::DuplicateBarcode(order.barcode.clone()));
            }
            rows.push(order.clone());
            Ok(())
        }

        async fn barcode_exists(&self, barcode: &str) -> Result<bool, RepositoryError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .any(|o| o.barcode == barcode))
        }
    }

    struct ScriptedBooking {
        replies: Mutex<VecDeque<Result<BookingReply, GatewayError>>>,
        calls: AtomicUsize,
        seen_barcodes: Mutex<Vec<String>>,
    }

    impl ScriptedBooking {
        fn new(replies: Vec<Result<BookingReply, GatewayError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                seen_barcodes: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookingGateway for ScriptedBooking {
        async fn book(&self, request: &BookingRequest) -> Result<BookingReply, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_barcodes
                .lock()
                .unwrap()
                .push(request.barcode.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("booking called more times than scripted")
        }
    }

    struct ScriptedApproval {
        reply: Mutex<Option<Result<ApprovalReply, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedApproval {
        fn new(reply: Result<ApprovalReply, GatewayError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                calls: AtomicUsize::new(0),
            })
        }

        fn never() -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(None),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ApprovalGateway for ScriptedApproval {
        async fn approve(&self, _barcode: &str) -> Result<ApprovalReply, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("approval called more times than scripted")
        }
    }

    struct FixedBarcodes {
        candidates: Mutex<VecDeque<String>>,
    }

    impl FixedBarcodes {
        fn new(candidates: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                candidates: Mutex::new(candidates.iter().map(|s| s.to_string()).collect()),
            })
        }
    }

    impl BarcodeSource for FixedBarcodes {
        fn draw(&self) -> String {
            self.candidates
                .lock()
                .unwrap()
                .pop_front()
                .expect("barcode source exhausted")
        }
    }

    fn sample_request() -> PlaceOrderRequest {
        PlaceOrderRequest {
            event_id: 3,
            event_date: "2021-08-21T13:00:00Z".parse().unwrap(),
            ticket_adult_price: 700,
            ticket_adult_quantity: 1,
            ticket_kid_price: 450,
            ticket_kid_quantity: 0,
            user_id: 451,
        }
    }

    fn workflow(
        repo: Arc<MemoryOrders>,
        booking: Arc<ScriptedBooking>,
        approval: Arc<ScriptedApproval>,
        barcodes: Arc<FixedBarcodes>,
    ) -> PlacementWorkflow {
        PlacementWorkflow::new(repo, booking, approval, barcodes)
    }

    #[tokio::test]
    async fn happy_path_persists_one_approved_order() {
        let repo = MemoryOrders::new();
        let booking = ScriptedBooking::new(vec![Ok(BookingReply::Booked)]);
        let approval = ScriptedApproval::new(Ok(ApprovalReply::Approved));
        let wf = workflow(
            repo.clone(),
            booking.clone(),
            approval.clone(),
            FixedBarcodes::new(&["00042017"]),
        );

        let outcome = wf.place_order(sample_request()).await.unwrap();

        match outcome {
            PlacementOutcome::Approved { order } => {
                assert_eq!(order.status, OrderStatus::Approved);
                assert_eq!(order.barcode, "00042017");
                assert_eq!(order.total_price, 700);
            }
            other => panic!("expected approval, got {:?}", other),
        }
        assert_eq!(repo.row_count(), 1);
        assert_eq!(booking.calls(), 1);
        assert_eq!(approval.calls(), 1);
    }

    #[tokio::test]
    async fn three_collisions_cancel_the_order_without_a_fourth_attempt() {
        let repo = MemoryOrders::new();
        let booking = ScriptedBooking::new(vec![
            Ok(BookingReply::BarcodeTaken),
            Ok(BookingReply::BarcodeTaken),
            Ok(BookingReply::BarcodeTaken),
        ]);
        let approval = ScriptedApproval::never();
        let wf = workflow(
            repo.clone(),
            booking.clone(),
            approval.clone(),
            FixedBarcodes::new(&["00000001", "00000002", "00000003", "00000004"]),
        );

        let outcome = wf.place_order(sample_request()).await.unwrap();

        match outcome {
            PlacementOutcome::Rejected { message } => assert_eq!(message, ORDER_CANCELLED),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(booking.calls(), 3);
        assert_eq!(approval.calls(), 0);
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn collision_then_success_books_with_the_regenerated_barcode() {
        let repo = MemoryOrders::new();
        let booking = ScriptedBooking::new(vec![
            Ok(BookingReply::BarcodeTaken),
            Ok(BookingReply::Booked),
        ]);
        let approval = ScriptedApproval::new(Ok(ApprovalReply::Approved));
        let wf = workflow(
            repo.clone(),
            booking.clone(),
            approval,
            FixedBarcodes::new(&["00000001", "00000002"]),
        );

        let outcome = wf.place_order(sample_request()).await.unwrap();

        match outcome {
            PlacementOutcome::Approved { order } => assert_eq!(order.barcode, "00000002"),
            other => panic!("expected approval, got {:?}", other),
        }
        assert_eq!(
            *booking.seen_barcodes.lock().unwrap(),
            vec!["00000001", "00000002"]
        );
    }

    #[tokio::test]
    async fn generation_skips_candidates_already_persisted() {
        let repo = MemoryOrders::seeded("00000007");
        let booking = ScriptedBooking::new(vec![Ok(BookingReply::Booked)]);
        let approval = ScriptedApproval::new(Ok(ApprovalReply::Approved));
        let wf = workflow(
            repo.clone(),
            booking.clone(),
            approval,
            FixedBarcodes::new(&["00000007", "00000008"]),
        );

        let outcome = wf.place_order(sample_request()).await.unwrap();

        match outcome {
            PlacementOutcome::Approved { order } => assert_eq!(order.barcode, "00000008"),
            other => panic!("expected approval, got {:?}", other),
        }
        // seeded row plus the new one, no barcode shared
        assert_eq!(repo.row_count(), 2);
    }

    #[tokio::test]
    async fn known_rejection_reason_maps_to_its_message() {
        let repo = MemoryOrders::new();
        let booking = ScriptedBooking::new(vec![Ok(BookingReply::Booked)]);
        let approval = ScriptedApproval::new(Ok(ApprovalReply::Rejected("no seats".to_string())));
        let wf = workflow(
            repo.clone(),
            booking,
            approval,
            FixedBarcodes::new(&["00000001"]),
        );

        let outcome = wf.place_order(sample_request()).await.unwrap();

        match outcome {
            PlacementOutcome::Rejected { message } => assert_eq!(message, "No seats available"),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn unknown_rejection_reason_falls_back_to_generic_message() {
        let repo = MemoryOrders::new();
        let booking = ScriptedBooking::new(vec![Ok(BookingReply::Booked)]);
        let approval =
            ScriptedApproval::new(Ok(ApprovalReply::Rejected("mercury retrograde".to_string())));
        let wf = workflow(
            repo.clone(),
            booking,
            approval,
            FixedBarcodes::new(&["00000001"]),
        );

        let outcome = wf.place_order(sample_request()).await.unwrap();

        match outcome {
            PlacementOutcome::Rejected { message } => assert_eq!(message, APPROVAL_REJECTED),
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn booking_transport_error_propagates_and_persists_nothing() {
        let repo = MemoryOrders::new();
        let booking = ScriptedBooking::new(vec![Err(GatewayError::Malformed(
            "unexpected end of input".to_string(),
        ))]);
        let approval = ScriptedApproval::never();
        let wf = workflow(
            repo.clone(),
            booking,
            approval.clone(),
            FixedBarcodes::new(&["00000001"]),
        );

        let result = wf.place_order(sample_request()).await;

        assert!(matches!(result, Err(PlacementError::Gateway(_))));
        assert_eq!(approval.calls(), 0);
        assert_eq!(repo.row_count(), 0);
    }

    /// Pre-check passes but the unique constraint rejects the write:
    /// another request claimed the barcode between check and insert.
    struct LostRaceOrders;

    #[async_trait]
    impl OrderRepository for LostRaceOrders {
        async fn insert_order(&self, order: &Order) -> Result<(), RepositoryError> {
            Err(RepositoryError::DuplicateBarcode(order.barcode.clone()))
        }

        async fn barcode_exists(&self, _barcode: &str) -> Result<bool, RepositoryError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn insert_time_barcode_conflict_surfaces_as_duplicate_error() {
        let booking = ScriptedBooking::new(vec![Ok(BookingReply::Booked)]);
        let approval = ScriptedApproval::new(Ok(ApprovalReply::Approved));
        let wf = PlacementWorkflow::new(
            Arc::new(LostRaceOrders),
            booking,
            approval,
            FixedBarcodes::new(&["00000009"]),
        );

        let result = wf.place_order(sample_request()).await;

        match result {
            Err(PlacementError::Repository(RepositoryError::DuplicateBarcode(barcode))) => {
                assert_eq!(barcode, "00000009")
            }
            other => panic!("expected duplicate barcode error, got {:?}", other),
        }
    }

    #[test]
    fn rejection_map_covers_the_enumerated_reasons() {
        assert_eq!(rejection_message("event cancelled"), "Event was cancelled");
        assert_eq!(rejection_message("no tickets"), "No tickets available");
        assert_eq!(rejection_message("no seats"), "No seats available");
        assert_eq!(rejection_message("fan removed"), "Fan was removed");
        assert_eq!(rejection_message(""), APPROVAL_REJECTED);
    }
}
