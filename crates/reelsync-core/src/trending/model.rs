use crate::catalog::{Movie, poster_url};
use crate::error::{ReelsyncError, Result};
use crate::store::{Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use std::cmp::Ordering;

pub const TERM_FIELD: &str = "searchTerm";
pub const COUNT_FIELD: &str = "count";

/// Number of entries shown in the "most searched" strip.
pub const DEFAULT_TOP_LIMIT: usize = 5;

/// Aggregate counter for one search term.
///
/// Exactly one entry per distinct term is expected. Entries never age out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    #[serde(rename = "searchTerm")]
    pub term: String,
    #[serde(rename = "movie_id")]
    pub representative_movie_id: u64,
    pub title: String,
    #[serde(rename = "poster_url", default)]
    pub poster_ref: Option<String>,
    #[serde(deserialize_with = "deserialize_count")]
    pub count: u64,
    /// Store metadata, used as the ranking tie-break.
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrendingEntry {
    /// A fresh entry with `count = 1`.
    pub fn first_search(term: &str, movie: &Movie, image_base_url: &str) -> Self {
        Self {
            term: term.to_string(),
            representative_movie_id: movie.id,
            title: movie.title.clone(),
            poster_ref: poster_url(image_base_url, movie.poster_path.as_deref()),
            count: 1,
            updated_at: None,
        }
    }

    pub fn to_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(ReelsyncError::internal(format!(
                "trending entry serialized to non-object: {other}"
            ))),
        }
    }

    pub fn from_document(document: &Document) -> Result<Self> {
        let mut entry: Self = serde_json::from_value(Value::Object(document.fields.clone()))?;
        entry.updated_at = document.updated_at;
        Ok(entry)
    }
}

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Accepts a non-negative integer, including stores that render it as `3.0`.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(count) = value.as_u64() {
        return Ok(count);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= MAX_EXACT_FLOAT => Ok(f as u64),
        _ => Err(de::Error::custom(format!(
            "count must be a non-negative integer, got {value}"
        ))),
    }
}

/// Sorts entries for display: `count` desc, most recently updated first, then term.
pub fn rank(entries: &mut [TrendingEntry]) {
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| match (a.updated_at, b.updated_at) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| a.term.cmp(&b.term))
    });
}
