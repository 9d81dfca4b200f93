//! In-memory statement storage for Banter.
//!
//! [`InMemoryStatementStore`] is the reference implementation of the
//! [`StatementStore`](banter_core::StatementStore) trait. It keeps statements
//! in insertion order behind an async lock, so filter results fall back to
//! natural order exactly like the persistent backends. Useful for tests and
//! for running a dialogue engine without external services.

use std::collections::HashSet;

use async_trait::async_trait;
use banter_core::{BanterError, Statement, StatementFilter, StatementStore};
use rand::{thread_rng, Rng};
use tokio::sync::RwLock;

/// An in-memory [`StatementStore`] backed by a `Vec` in insertion order.
pub struct InMemoryStatementStore {
    statements: RwLock<Vec<Statement>>,
}

impl InMemoryStatementStore {
    pub fn new() -> Self {
        Self {
            statements: RwLock::new(Vec::new()),
        }
    }

    /// Create a store pre-populated with statements.
    pub fn from_statements(statements: impl IntoIterator<Item = Statement>) -> Self {
        Self {
            statements: RwLock::new(statements.into_iter().collect()),
        }
    }
}

impl Default for InMemoryStatementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatementStore for InMemoryStatementStore {
    async fn create(&self, statement: Statement) -> Result<Statement, BanterError> {
        let mut statements = self.statements.write().await;
        statements.push(statement.clone());
        Ok(statement)
    }

    async fn update(&self, statement: &Statement) -> Result<(), BanterError> {
        // Single write lock makes the find-and-replace atomic.
        let mut statements = self.statements.write().await;
        match statements.iter().position(|s| s.text == statement.text) {
            Some(index) => statements[index] = statement.clone(),
            None => statements.push(statement.clone()),
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, BanterError> {
        Ok(self.statements.read().await.len() as u64)
    }

    async fn filter(&self, filter: &StatementFilter) -> Result<Vec<Statement>, BanterError> {
        let statements = self.statements.read().await;
        let mut results: Vec<Statement> = statements
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        filter.sort(&mut results);
        Ok(results)
    }

    async fn remove(&self, text: &str) -> Result<(), BanterError> {
        let mut statements = self.statements.write().await;
        if let Some(index) = statements.iter().position(|s| s.text == text) {
            statements.remove(index);
        }
        Ok(())
    }

    async fn get_random(&self) -> Result<Statement, BanterError> {
        let statements = self.statements.read().await;
        if statements.is_empty() {
            return Err(BanterError::EmptyStore);
        }
        let index = thread_rng().gen_range(0..statements.len());
        Ok(statements[index].clone())
    }

    async fn response_statements(&self) -> Result<Vec<Statement>, BanterError> {
        let statements = self.statements.read().await;

        let referenced: HashSet<&str> = statements
            .iter()
            .flat_map(|s| s.in_response_to.texts())
            .map(String::as_str)
            .collect();

        let mut seen = HashSet::new();
        let results = statements
            .iter()
            .filter(|s| referenced.contains(s.text.as_str()) && seen.insert(s.text.as_str()))
            .cloned()
            .collect();
        Ok(results)
    }

    async fn drop_all(&self) -> Result<(), BanterError> {
        self.statements.write().await.clear();
        Ok(())
    }
}
