//! Document store contract.
//!
//! A generic NoSQL-style collection service: filter-based listing plus
//! create/update/delete by id. No transactions and no conditional writes, so
//! every read-then-write built on top of it is eventually consistent.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Field map of a document, excluding store metadata.
pub type Fields = Map<String, Value>;

/// Metadata field holding the document id.
pub const ID_FIELD: &str = "$id";
/// Metadata field holding the creation timestamp.
pub const CREATED_AT_FIELD: &str = "$createdAt";
/// Metadata field holding the last-update timestamp.
pub const UPDATED_AT_FIELD: &str = "$updatedAt";

/// Logical collections used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    SearchTerms,
    SavedItems,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::SearchTerms => "search-terms",
            Collection::SavedItems => "saved-items",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fields: Fields,
}

impl Document {
    /// Resolves a field by name, including the `$`-prefixed metadata fields.
    pub fn value(&self, field: &str) -> Option<Value> {
        match field {
            ID_FIELD => Some(Value::String(self.id.clone())),
            CREATED_AT_FIELD => self.created_at.map(|t| Value::String(t.to_rfc3339())),
            UPDATED_AT_FIELD => self.updated_at.map(|t| Value::String(t.to_rfc3339())),
            _ => self.fields.get(field).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal { field: String, value: Value },
}

impl Filter {
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::Equal { field, value } => document.value(field).as_ref() == Some(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Filters, ordering keys (applied in sequence) and an optional limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equal(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equal {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order.push(OrderBy {
            field: field.into(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn order_asc(mut self, field: impl Into<String>) -> Self {
        self.order.push(OrderBy {
            field: field.into(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(document))
    }

    /// Orders documents by the query's ordering keys.
    ///
    /// Missing values sort after present ones regardless of direction.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for key in &self.order {
            let ordering = match (a.value(&key.field), b.value(&key.field)) {
                (Some(x), Some(y)) => {
                    let natural = compare_values(&x, &y);
                    match key.direction {
                        Direction::Asc => natural,
                        Direction::Desc => natural.reverse(),
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Filters, sorts and truncates a document set the way a store would.
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut out: Vec<Document> = documents.into_iter().filter(|d| self.matches(d)).collect();
        out.sort_by(|a, b| self.compare(a, b));
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Rank of a value's kind, so values of different kinds still compare totally.
/// RFC 3339 strings form their own kind below other strings.
fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(s) if DateTime::parse_from_rfc3339(s).is_ok() => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    kind_rank(a).cmp(&kind_rank(b)).then_with(|| match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => {
            // Timestamps compare by instant; offsets make the raw text unreliable.
            match (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

/// Remote document database.
///
/// Every failure is reported as `ReelsyncError::StoreUnavailable`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list(&self, collection: Collection, query: &Query) -> Result<Vec<Document>>;

    async fn create(&self, collection: Collection, fields: Fields) -> Result<Document>;

    /// Merges `fields` into an existing document.
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<Document>;

    async fn delete(&self, collection: Collection, id: &str) -> Result<()>;
}
