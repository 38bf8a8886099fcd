//! Trending search-term domain module.

mod model;

pub use model::{COUNT_FIELD, DEFAULT_TOP_LIMIT, TERM_FIELD, TrendingEntry, rank};
