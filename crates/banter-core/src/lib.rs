//! Core types for Banter statement storage.
//!
//! This crate defines:
//! - [`Statement`]: an utterance record, optionally linked to the utterance(s)
//!   it replies to.
//! - [`StatementFilter`]: structured query criteria accepted by every store.
//! - [`StatementStore`]: the trait implemented by storage backends
//!   (in-memory in `banter-store`, MongoDB in `banter-mongodb`).
//! - [`BanterError`]: the shared error enum.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ResponseRef
// ---------------------------------------------------------------------------

/// The utterance(s) a statement is considered a response to.
///
/// Three shapes are distinguished and must survive storage round-trips:
/// no response link at all ([`ResponseRef::None`]), a single utterance
/// ([`ResponseRef::Single`]), and an explicit list — possibly empty —
/// ([`ResponseRef::Many`]). `None` and `Many(vec![])` are NOT the same value:
/// a statement may respond to an empty set without being response-less.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseRef {
    /// The statement is not a response to anything.
    #[default]
    None,
    /// The statement responds to exactly one utterance.
    Single(String),
    /// The statement responds to a list of utterances (may be empty).
    Many(Vec<String>),
}

impl ResponseRef {
    /// Whether this is the absent shape.
    pub fn is_none(&self) -> bool {
        matches!(self, ResponseRef::None)
    }

    /// The referenced utterance texts, as a slice.
    ///
    /// `None` yields an empty slice, `Single` a slice of one.
    pub fn texts(&self) -> &[String] {
        match self {
            ResponseRef::None => &[],
            ResponseRef::Single(text) => std::slice::from_ref(text),
            ResponseRef::Many(texts) => texts,
        }
    }

    /// Whether the given utterance text is referenced here.
    pub fn contains(&self, text: &str) -> bool {
        match self {
            ResponseRef::None => false,
            ResponseRef::Single(t) => t == text,
            ResponseRef::Many(ts) => ts.iter().any(|t| t == text),
        }
    }
}

impl From<&str> for ResponseRef {
    fn from(text: &str) -> Self {
        ResponseRef::Single(text.to_string())
    }
}

impl From<String> for ResponseRef {
    fn from(text: String) -> Self {
        ResponseRef::Single(text)
    }
}

impl From<Vec<String>> for ResponseRef {
    fn from(texts: Vec<String>) -> Self {
        ResponseRef::Many(texts)
    }
}

impl From<Vec<&str>> for ResponseRef {
    fn from(texts: Vec<&str>) -> Self {
        ResponseRef::Many(texts.into_iter().map(String::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

/// An utterance record.
///
/// Equality compares `text` and `in_response_to` only; `created_at` is a
/// storage detail and does not participate in identity, so statements read
/// back from a store compare equal to the values that produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// The utterance content. Acts as the natural key for [`StatementStore::update`].
    pub text: String,
    /// The utterance(s) this statement responds to.
    #[serde(default, skip_serializing_if = "ResponseRef::is_none")]
    pub in_response_to: ResponseRef,
    /// When the statement was created. Defaults to construction time.
    pub created_at: DateTime<Utc>,
}

impl Statement {
    /// Create a statement with the given text, no response link, and
    /// `created_at` set to now.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_response_to: ResponseRef::None,
            created_at: Utc::now(),
        }
    }

    /// Set the response link.
    pub fn with_in_response_to(mut self, in_response_to: impl Into<ResponseRef>) -> Self {
        self.in_response_to = in_response_to.into();
        self
    }

    /// Set an explicit creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text && self.in_response_to == other.in_response_to
    }
}

impl Eq for Statement {}

// ---------------------------------------------------------------------------
// StatementFilter
// ---------------------------------------------------------------------------

/// A field statements can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Text,
    CreatedAt,
}

impl SortKey {
    /// The persisted field name for this key.
    pub fn field_name(&self) -> &'static str {
        match self {
            SortKey::Text => "text",
            SortKey::CreatedAt => "created_at",
        }
    }
}

/// Structured query criteria for [`StatementStore::filter`].
///
/// All present criteria must match (logical AND). The default filter matches
/// every statement and returns them in natural insertion order.
#[derive(Debug, Clone, Default)]
pub struct StatementFilter {
    /// Exact `text` match.
    pub text: Option<String>,
    /// `in_response_to` match. `Some(ResponseRef::None)` selects statements
    /// whose response link is absent — distinct from no criterion at all.
    pub in_response_to: Option<ResponseRef>,
    /// Texts to exclude from the result.
    pub exclude_text: Vec<String>,
    /// Sort keys applied in sequence, each ascending. Ties keep natural
    /// insertion order.
    pub order_by: Vec<SortKey>,
}

impl StatementFilter {
    /// A filter that matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact `text` match.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Require an `in_response_to` match.
    ///
    /// A [`ResponseRef::Single`] criterion matches statements whose link is
    /// the same scalar or a list containing it. A [`ResponseRef::Many`]
    /// criterion requires an exact list match, so `Many(vec![])` selects
    /// exactly the statements stored with an explicit empty list.
    pub fn with_in_response_to(mut self, in_response_to: impl Into<ResponseRef>) -> Self {
        self.in_response_to = Some(in_response_to.into());
        self
    }

    /// Exclude statements whose `text` is any of the given values.
    pub fn without_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_text.extend(texts.into_iter().map(Into::into));
        self
    }

    /// Append a sort key.
    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order_by.push(key);
        self
    }

    /// Whether the statement satisfies every present criterion.
    pub fn matches(&self, statement: &Statement) -> bool {
        if let Some(text) = &self.text {
            if statement.text != *text {
                return false;
            }
        }
        if self.exclude_text.iter().any(|t| *t == statement.text) {
            return false;
        }
        if let Some(criterion) = &self.in_response_to {
            let matched = match criterion {
                ResponseRef::None => statement.in_response_to.is_none(),
                ResponseRef::Single(text) => statement.in_response_to.contains(text),
                ResponseRef::Many(_) => statement.in_response_to == *criterion,
            };
            if !matched {
                return false;
            }
        }
        true
    }

    /// Sort statements by the configured keys. Stable, so ties keep their
    /// current (natural) order.
    pub fn sort(&self, statements: &mut [Statement]) {
        if self.order_by.is_empty() {
            return;
        }
        statements.sort_by(|a, b| {
            self.order_by
                .iter()
                .map(|key| match key {
                    SortKey::Text => a.text.cmp(&b.text),
                    SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}

// ---------------------------------------------------------------------------
// BanterError
// ---------------------------------------------------------------------------

/// Errors surfaced by statement stores.
///
/// Absence of matches is not an error: `filter` returns an empty vec and
/// `remove` is a silent no-op.
#[derive(Error, Debug)]
pub enum BanterError {
    /// The backing store could not be reached, at construction or operation
    /// time. Not retried internally.
    #[error("connection error: {0}")]
    Connection(String),
    /// `get_random` was called on a store with no persisted statements.
    #[error("empty store: no statements have been persisted")]
    EmptyStore,
    /// Any other backend failure (malformed record, serialization, driver
    /// error), wrapping the underlying cause.
    #[error("storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// StatementStore trait
// ---------------------------------------------------------------------------

/// A persistence backend for [`Statement`] records.
#[async_trait]
pub trait StatementStore: Send + Sync {
    /// Insert a new record unconditionally and return the stored value.
    /// Duplicates are allowed; the persisted count increases by exactly one.
    async fn create(&self, statement: Statement) -> Result<Statement, BanterError>;

    /// Upsert keyed on `text`: overwrite the mutable fields of an existing
    /// record with the same `text`, or insert a new record if none exists.
    /// Implementations must use a single atomic find-and-replace primitive so
    /// concurrent updates on the same key cannot interleave.
    async fn update(&self, statement: &Statement) -> Result<(), BanterError>;

    /// Total number of persisted records. 0 on a fresh store.
    async fn count(&self) -> Result<u64, BanterError>;

    /// Statements matching the filter, fully decoded. No matches is an empty
    /// vec, never an error.
    async fn filter(&self, filter: &StatementFilter) -> Result<Vec<Statement>, BanterError>;

    /// Delete the first record whose `text` equals the argument. Matches
    /// strictly on `text`, never on `in_response_to`. No-op when nothing
    /// matches.
    async fn remove(&self, text: &str) -> Result<(), BanterError>;

    /// A uniformly-selected random statement.
    ///
    /// Returns [`BanterError::EmptyStore`] when no statements are persisted.
    async fn get_random(&self) -> Result<Statement, BanterError>;

    /// Statements that some other statement's `in_response_to` points at
    /// (as its scalar value or any list element), deduplicated by `text`.
    /// Order is unspecified.
    async fn response_statements(&self) -> Result<Vec<Statement>, BanterError>;

    /// Destroy all persisted data and backend resources. Idempotent.
    async fn drop_all(&self) -> Result<(), BanterError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
