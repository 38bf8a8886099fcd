use crate::catalog::{Movie, poster_url};
use crate::error::{ReelsyncError, Result};
use crate::store::{Document, Fields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OWNER_FIELD: &str = "user_id";
pub const MOVIE_FIELD: &str = "movie_id";
pub const SAVED_AT_FIELD: &str = "saved_at";

/// A movie in a user's saved list.
///
/// At most one record per (`owner_id`, `movie_id`) should exist. The store
/// cannot enforce that, so writers read before they write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    #[serde(rename = "user_id")]
    pub owner_id: String,
    /// Catalog id, stored as a string.
    #[serde(rename = "movie_id")]
    pub movie_id: String,
    pub title: String,
    #[serde(rename = "poster_url", default)]
    pub poster_ref: Option<String>,
    #[serde(rename = "vote_average", default)]
    pub rating: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub saved_at: DateTime<Utc>,
}

impl SavedItem {
    pub fn from_movie(
        owner_id: &str,
        movie: &Movie,
        image_base_url: &str,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            movie_id: movie.id.to_string(),
            title: movie.title.clone(),
            poster_ref: poster_url(image_base_url, movie.poster_path.as_deref()),
            rating: movie.vote_average,
            release_date: movie.release_date.clone(),
            genre_ids: movie.genre_ids.clone(),
            saved_at,
        }
    }

    pub fn to_fields(&self) -> Result<Fields> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(ReelsyncError::internal(format!(
                "saved item serialized to non-object: {other}"
            ))),
        }
    }

    pub fn from_document(document: &Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(document.fields.clone()))?)
    }
}

/// Membership of a movie in the saved set after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedState {
    Saved,
    NotSaved,
}

impl SavedState {
    pub fn is_saved(&self) -> bool {
        matches!(self, SavedState::Saved)
    }
}

impl From<bool> for SavedState {
    fn from(saved: bool) -> Self {
        if saved {
            SavedState::Saved
        } else {
            SavedState::NotSaved
        }
    }
}
