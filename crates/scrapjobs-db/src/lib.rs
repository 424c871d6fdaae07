pub mod config;
pub mod database;
pub mod repository;

pub use config::DatabaseConfig;
pub use database::Database;
pub use repository::{IngestReport, JobRepository, NEW_TAG, ingest_tags};
