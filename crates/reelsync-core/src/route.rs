//! Navigation access rules.

use crate::session::SessionState;

/// Screens of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Signup,
    Home,
    Search,
    Saved,
    Profile,
    Movie(u64),
}

impl Route {
    /// Routes reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }

    /// Parses a navigator path such as `/(auth)/login`, `/search` or `/movie/42`.
    ///
    /// Unknown paths resolve to `Home`, like the tab root.
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !(s.starts_with('(') && s.ends_with(')')))
            .collect();

        match segments.as_slice() {
            [.., "movie", id] => id.parse().map(Route::Movie).unwrap_or(Route::Home),
            [.., last] => match *last {
                "login" => Route::Login,
                "signup" => Route::Signup,
                "search" => Route::Search,
                "save" | "saved" => Route::Saved,
                "profile" => Route::Profile,
                _ => Route::Home,
            },
            [] => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Home => "/".to_string(),
            Route::Search => "/search".to_string(),
            Route::Saved => "/saved".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Movie(id) => format!("/movie/{id}"),
        }
    }
}

/// What the navigator should do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Session outcome not known yet; show a neutral waiting indicator.
    Wait,
    Allow,
    Redirect(Route),
}

/// Decides access to `target` from the session state alone. Never does I/O.
pub fn decide(state: &SessionState, target: &Route) -> RouteDecision {
    match state {
        SessionState::Unknown | SessionState::Checking => RouteDecision::Wait,
        SessionState::Anonymous if !target.is_public() => RouteDecision::Redirect(Route::Login),
        _ => RouteDecision::Allow,
    }
}
