//! Read-only movie metadata.
//!
//! Pure pass-through: nothing here is cached or synchronized.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default base for poster image URLs.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// A movie as returned by list endpoints (search, popular, trending).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Full movie record as returned by the details endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget: Option<u64>,
    #[serde(default)]
    pub revenue: Option<u64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl MovieDetail {
    /// List-shaped view of the details, used when saving from a details screen.
    pub fn to_movie(&self) -> Movie {
        Movie {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            vote_average: self.vote_average,
            release_date: self.release_date.clone(),
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
        }
    }
}

/// Builds an absolute poster URL from a catalog poster path.
pub fn poster_url(image_base_url: &str, poster_path: Option<&str>) -> Option<String> {
    let path = poster_path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = image_base_url.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{base}{path}"))
    } else {
        Some(format!("{base}/{path}"))
    }
}

/// Movie metadata API.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Movie>>;

    async fn popular(&self) -> Result<Vec<Movie>>;

    async fn trending(&self) -> Result<Vec<Movie>>;

    async fn details(&self, id: u64) -> Result<MovieDetail>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poster_url_joins_paths() {
        assert_eq!(
            poster_url(DEFAULT_IMAGE_BASE_URL, Some("/abc.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(
            poster_url("https://img.example/", Some("abc.jpg")).as_deref(),
            Some("https://img.example/abc.jpg")
        );
        assert_eq!(poster_url(DEFAULT_IMAGE_BASE_URL, None), None);
        assert_eq!(poster_url(DEFAULT_IMAGE_BASE_URL, Some("  ")), None);
    }

    #[test]
    fn test_movie_tolerates_missing_optional_fields() {
        let movie: Movie = serde_json::from_str(r#"{"id": 1, "title": "Dune"}"#).unwrap();
        assert_eq!(movie.poster_path, None);
        assert!(movie.genre_ids.is_empty());
    }

    #[test]
    fn test_detail_to_movie_keeps_genre_ids() {
        let detail: MovieDetail = serde_json::from_str(
            r#"{"id": 7, "title": "Arrival", "genres": [{"id": 18, "name": "Drama"}]}"#,
        )
        .unwrap();
        assert_eq!(detail.to_movie().genre_ids, vec![18]);
    }
}
