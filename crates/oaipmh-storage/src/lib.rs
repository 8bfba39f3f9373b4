//! OAI-PMH storage crate - SQLite persistence for harvested records.
//!
//! Provides a WAL-mode SQLite database with migrations and repository
//! implementations for metadata formats, records and the Matterhorn
//! records derived from them.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{MatterhornRecordRepository, MetadataFormatRepository, RecordRepository};
