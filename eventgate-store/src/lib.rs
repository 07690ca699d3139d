pub mod app_config;
pub mod database;
pub mod order_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use order_repo::PgOrderRepository;
