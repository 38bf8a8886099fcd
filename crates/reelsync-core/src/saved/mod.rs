//! Saved-movie domain module.

mod model;

pub use model::{MOVIE_FIELD, OWNER_FIELD, SAVED_AT_FIELD, SavedItem, SavedState};
