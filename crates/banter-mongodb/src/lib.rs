//! MongoDB statement storage for Banter.
//!
//! This crate provides [`MongoStatementStore`], an implementation of the
//! [`StatementStore`](banter_core::StatementStore) trait backed by a MongoDB
//! collection of statement documents.
//!
//! # Example
//!
//! ```rust,no_run
//! use banter_mongodb::{MongoStatementStore, MongoStoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MongoStoreConfig::new("banter_database");
//! let store = MongoStatementStore::from_uri("mongodb://localhost:27017", config).await?;
//! # Ok(())
//! # }
//! ```

mod mapping;
mod store;

pub use store::{MongoStatementStore, MongoStoreConfig};

// Re-export core types for convenience.
pub use banter_core::{BanterError, ResponseRef, Statement, StatementFilter, StatementStore};
