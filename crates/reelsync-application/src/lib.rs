//! Application layer for Reelsync.
//!
//! Use cases that coordinate the domain contracts in `reelsync-core`: the
//! session lifecycle, route gating, saved items, trending terms and search.
//! Concrete services are injected as trait objects by the caller.

pub mod route_guard;
pub mod saved_items;
pub mod search_usecase;
pub mod session_manager;
pub mod trending;

pub use route_guard::RouteGuard;
pub use saved_items::SavedItemSynchronizer;
pub use search_usecase::SearchUseCase;
pub use session_manager::{LogoutOutcome, SessionManager, VerifyOutcome};
pub use trending::TrendingCounter;
