pub mod catalog;
pub mod config;
pub mod error;
pub mod route;
pub mod saved;
pub mod session;
pub mod store;
pub mod trending;

// Re-export common error type
pub use error::{ReelsyncError, Result};
