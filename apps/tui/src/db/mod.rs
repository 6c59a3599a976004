pub mod migrations;
pub mod models;
pub mod queries;
pub use migrations::{create_database_pool, setup_database};
pub use queries::{load_remembered, remember, set_preference};
