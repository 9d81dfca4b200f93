use std::collections::HashSet;

use async_trait::async_trait;
use banter_core::{BanterError, Statement, StatementFilter, StatementStore};
use bson::{doc, Bson, Document as BsonDocument};
use futures::TryStreamExt;
use mongodb::options::{FindOptions, UpdateOptions};
use mongodb::{Client, Collection, Database};

use crate::mapping::{
    document_to_statement, filter_to_query, filter_to_sort, statement_to_document,
};

/// Map a driver error, keeping connectivity failures distinct from other
/// storage failures.
fn driver_error(context: &str, error: mongodb::error::Error) -> BanterError {
    match *error.kind {
        mongodb::error::ErrorKind::ServerSelection { .. } => {
            BanterError::Connection(format!("{context}: {error}"))
        }
        _ => BanterError::Storage(format!("{context}: {error}")),
    }
}

// ---------------------------------------------------------------------------
// MongoStoreConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`MongoStatementStore`].
#[derive(Debug, Clone)]
pub struct MongoStoreConfig {
    /// MongoDB database name.
    pub database: String,
    /// Collection holding statement documents (default: `statements`).
    pub collection: String,
}

impl MongoStoreConfig {
    /// Create a new config for the given database name.
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: "statements".to_string(),
        }
    }

    /// Set the statement collection name.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }
}

// ---------------------------------------------------------------------------
// MongoStatementStore
// ---------------------------------------------------------------------------

/// A [`StatementStore`] implementation backed by a MongoDB collection.
///
/// The store owns its connection handle: it is opened in [`from_uri`] and the
/// backing database is destroyed by [`drop_all`], which test harnesses use
/// for teardown.
///
/// [`from_uri`]: MongoStatementStore::from_uri
/// [`drop_all`]: StatementStore::drop_all
pub struct MongoStatementStore {
    config: MongoStoreConfig,
    client: Client,
    database: Database,
    collection: Collection<BsonDocument>,
}

impl MongoStatementStore {
    /// Create a new store by connecting to MongoDB at the given URI.
    pub async fn from_uri(uri: &str, config: MongoStoreConfig) -> Result<Self, BanterError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| BanterError::Connection(format!("failed to connect to MongoDB: {e}")))?;

        let store = Self::from_client(client, config);
        store.raise_sort_buffer().await;
        Ok(store)
    }

    /// Create a new store from an existing MongoDB client.
    pub fn from_client(client: Client, config: MongoStoreConfig) -> Self {
        let database = client.database(&config.database);
        let collection = database.collection::<BsonDocument>(&config.collection);
        Self {
            config,
            client,
            database,
            collection,
        }
    }

    /// Return a reference to the underlying MongoDB client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Return a reference to the configuration.
    pub fn config(&self) -> &MongoStoreConfig {
        &self.config
    }

    /// Return a reference to the underlying statement collection.
    pub fn collection(&self) -> &Collection<BsonDocument> {
        &self.collection
    }

    /// Ask the server for a 42MB in-memory sort buffer. Servers that reject
    /// the parameter keep their default; sorted queries just spill earlier.
    async fn raise_sort_buffer(&self) {
        let command = doc! {
            "setParameter": 1,
            "internalQueryExecMaxBlockingSortBytes": 44_040_192_i32,
        };
        if let Err(e) = self.client.database("admin").run_command(command).await {
            tracing::debug!("could not raise sort buffer: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// StatementStore implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl StatementStore for MongoStatementStore {
    async fn create(&self, statement: Statement) -> Result<Statement, BanterError> {
        self.collection
            .insert_one(statement_to_document(&statement))
            .await
            .map_err(|e| driver_error("MongoDB insert failed", e))?;
        Ok(statement)
    }

    async fn update(&self, statement: &Statement) -> Result<(), BanterError> {
        // Single server-side upsert keyed on `text`; concurrent updates on the
        // same key resolve last-writer-wins without a find-then-write window.
        self.collection
            .update_one(
                doc! { "text": &statement.text },
                doc! { "$set": statement_to_document(statement) },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await
            .map_err(|e| driver_error("MongoDB upsert failed", e))?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, BanterError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| driver_error("MongoDB count failed", e))
    }

    async fn filter(&self, filter: &StatementFilter) -> Result<Vec<Statement>, BanterError> {
        let options = FindOptions::builder().sort(filter_to_sort(filter)).build();

        let mut cursor = self
            .collection
            .find(filter_to_query(filter))
            .with_options(options)
            .await
            .map_err(|e| driver_error("MongoDB find failed", e))?;

        let mut results = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| driver_error("MongoDB cursor error", e))?
        {
            results.push(document_to_statement(&document)?);
        }
        Ok(results)
    }

    async fn remove(&self, text: &str) -> Result<(), BanterError> {
        self.collection
            .delete_one(doc! { "text": text })
            .await
            .map_err(|e| driver_error("MongoDB delete failed", e))?;
        Ok(())
    }

    async fn get_random(&self) -> Result<Statement, BanterError> {
        let pipeline = vec![doc! { "$sample": { "size": 1 } }];

        let mut cursor = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| driver_error("MongoDB aggregation failed", e))?;

        match cursor
            .try_next()
            .await
            .map_err(|e| driver_error("MongoDB cursor error", e))?
        {
            Some(document) => document_to_statement(&document),
            None => Err(BanterError::EmptyStore),
        }
    }

    async fn response_statements(&self) -> Result<Vec<Statement>, BanterError> {
        // Pass one: collect every utterance text referenced by a response link.
        let mut cursor = self
            .collection
            .find(doc! { "in_response_to": { "$ne": null } })
            .await
            .map_err(|e| driver_error("MongoDB find failed", e))?;

        let mut seen = HashSet::new();
        let mut referenced = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| driver_error("MongoDB cursor error", e))?
        {
            let statement = document_to_statement(&document)?;
            for text in statement.in_response_to.texts() {
                if seen.insert(text.clone()) {
                    referenced.push(Bson::String(text.clone()));
                }
            }
        }

        if referenced.is_empty() {
            return Ok(Vec::new());
        }

        // Pass two: fetch the statements those texts name, one per text.
        let mut cursor = self
            .collection
            .find(doc! { "text": { "$in": referenced } })
            .await
            .map_err(|e| driver_error("MongoDB find failed", e))?;

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        while let Some(document) = cursor
            .try_next()
            .await
            .map_err(|e| driver_error("MongoDB cursor error", e))?
        {
            let statement = document_to_statement(&document)?;
            if seen.insert(statement.text.clone()) {
                results.push(statement);
            }
        }
        Ok(results)
    }

    async fn drop_all(&self) -> Result<(), BanterError> {
        self.database
            .drop()
            .await
            .map_err(|e| driver_error("MongoDB drop database failed", e))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
