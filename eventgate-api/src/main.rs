use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use eventgate_api::{app, gateways, AppState};
use eventgate_order::{PlacementWorkflow, RandomBarcodes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventgate_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = eventgate_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting Eventgate API on port {}", config.server.port);

    let db = eventgate_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let repository = Arc::new(eventgate_store::PgOrderRepository::new(db.pool.clone()));

    let client = gateways::http_client(Duration::from_secs(config.gateways.timeout_seconds))
        .expect("Failed to build HTTP client");
    let booking = Arc::new(gateways::HttpBookingGateway::new(
        client.clone(),
        config.gateways.booking_url.clone(),
    ));
    let approval = Arc::new(gateways::HttpApprovalGateway::new(
        client,
        config.gateways.approval_url.clone(),
    ));

    let workflow = Arc::new(PlacementWorkflow::new(
        repository,
        booking,
        approval,
        Arc::new(RandomBarcodes),
    ));

    let app = app(AppState { workflow });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
