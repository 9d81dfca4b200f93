//! Banter — statement storage for a conversational dialogue engine.
//!
//! This crate re-exports the Banter sub-crates for convenient single-import
//! usage. Enable features to control which backends are available.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `default` | `store` |
//! | `store` | In-memory `InMemoryStatementStore` |
//! | `mongodb` | MongoDB-backed `MongoStatementStore` |
//! | `full` | All backends |
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use banter::core::{Statement, StatementFilter, StatementStore};
//! use banter::store::InMemoryStatementStore;
//! ```

/// Core types: Statement, ResponseRef, StatementFilter, SortKey,
/// StatementStore, BanterError. Always available.
pub use banter_core as core;

/// In-memory statement store.
#[cfg(feature = "store")]
pub use banter_store as store;

/// MongoDB-backed statement store.
#[cfg(feature = "mongodb")]
pub use banter_mongodb as mongodb;
