//! Conversions between [`Statement`] values and MongoDB documents, and
//! translation of [`StatementFilter`] criteria into driver queries.
//!
//! Statement documents have the shape:
//! - `text`: string
//! - `in_response_to`: null, string, or array of strings
//! - `created_at`: BSON datetime (millisecond precision)
//!
//! An absent response link is stored as an explicit null so that querying for
//! it stays a plain equality match.

use banter_core::{BanterError, ResponseRef, Statement, StatementFilter};
use bson::{doc, Bson, Document as BsonDocument};
use chrono::Utc;

pub(crate) fn response_ref_to_bson(response_ref: &ResponseRef) -> Bson {
    match response_ref {
        ResponseRef::None => Bson::Null,
        ResponseRef::Single(text) => Bson::String(text.clone()),
        ResponseRef::Many(texts) => {
            Bson::Array(texts.iter().cloned().map(Bson::String).collect())
        }
    }
}

pub(crate) fn statement_to_document(statement: &Statement) -> BsonDocument {
    doc! {
        "text": &statement.text,
        "in_response_to": response_ref_to_bson(&statement.in_response_to),
        "created_at": bson::DateTime::from_chrono(statement.created_at),
    }
}

/// Decode a persisted statement document back into a [`Statement`].
///
/// Missing or null `in_response_to` decodes as [`ResponseRef::None`]; a
/// missing `created_at` falls back to now, matching the model constructor.
pub(crate) fn document_to_statement(document: &BsonDocument) -> Result<Statement, BanterError> {
    let text = document
        .get_str("text")
        .map_err(|e| BanterError::Storage(format!("statement record has no text: {e}")))?;

    let in_response_to = match document.get("in_response_to") {
        None | Some(Bson::Null) => ResponseRef::None,
        Some(Bson::String(value)) => ResponseRef::Single(value.clone()),
        Some(Bson::Array(values)) => {
            let mut texts = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Bson::String(text) => texts.push(text.clone()),
                    other => {
                        return Err(BanterError::Storage(format!(
                            "malformed in_response_to element: {other}"
                        )))
                    }
                }
            }
            ResponseRef::Many(texts)
        }
        Some(other) => {
            return Err(BanterError::Storage(format!(
                "malformed in_response_to field: {other}"
            )))
        }
    };

    let created_at = match document.get("created_at") {
        Some(Bson::DateTime(datetime)) => datetime.to_chrono(),
        _ => Utc::now(),
    };

    Ok(Statement::new(text)
        .with_in_response_to(in_response_to)
        .with_created_at(created_at))
}

/// Build the find query for the given filter criteria.
pub(crate) fn filter_to_query(filter: &StatementFilter) -> BsonDocument {
    let mut query = BsonDocument::new();

    let excluded: Vec<Bson> = filter
        .exclude_text
        .iter()
        .cloned()
        .map(Bson::String)
        .collect();

    match (&filter.text, excluded.is_empty()) {
        (Some(text), true) => {
            query.insert("text", text.clone());
        }
        (Some(text), false) => {
            query.insert("text", doc! { "$eq": text.clone(), "$nin": excluded });
        }
        (None, false) => {
            query.insert("text", doc! { "$nin": excluded });
        }
        (None, true) => {}
    }

    if let Some(criterion) = &filter.in_response_to {
        query.insert("in_response_to", response_ref_to_bson(criterion));
    }

    query
}

/// Build the sort document for the given filter, or `None` when unsorted.
///
/// A trailing `_id` key keeps ties in insertion order.
pub(crate) fn filter_to_sort(filter: &StatementFilter) -> Option<BsonDocument> {
    if filter.order_by.is_empty() {
        return None;
    }
    let mut sort = BsonDocument::new();
    for key in &filter.order_by {
        sort.insert(key.field_name(), 1);
    }
    sort.insert("_id", 1);
    Some(sort)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
