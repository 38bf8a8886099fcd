//! Navigation gate driven by the session state.

use reelsync_core::route::{Route, RouteDecision, decide};
use reelsync_core::session::SessionState;
use tokio::sync::watch;

/// Evaluates navigation attempts against the live session state.
///
/// Never performs I/O; it only reads what the session manager broadcasts.
pub struct RouteGuard {
    state: watch::Receiver<SessionState>,
}

impl RouteGuard {
    pub fn new(state: watch::Receiver<SessionState>) -> Self {
        Self { state }
    }

    /// Decision for `target` under the current state.
    pub fn evaluate(&self, target: &Route) -> RouteDecision {
        decide(&self.state.borrow(), target)
    }

    /// Waits until the session state is settled and returns the decision.
    ///
    /// Returns `Wait` only if the session manager is gone before a verdict.
    pub async fn settle(&mut self, target: &Route) -> RouteDecision {
        match self.state.wait_for(|state| !state.is_pending()).await {
            Ok(state) => decide(&state, target),
            Err(_) => RouteDecision::Wait,
        }
    }

    /// Waits for the next state change and returns the decision it implies.
    ///
    /// Returns `None` once the session manager has been dropped.
    pub async fn next_decision(&mut self, target: &Route) -> Option<RouteDecision> {
        self.state.changed().await.ok()?;
        Some(decide(&self.state.borrow_and_update(), target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsync_core::session::{Credential, Profile, Session};

    fn authenticated() -> SessionState {
        SessionState::Authenticated(Session {
            profile: Profile {
                user_id: "1".to_string(),
                display_name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
            },
            credential: Credential::new("t"),
        })
    }

    #[tokio::test]
    async fn test_evaluate_follows_state() {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        let guard = RouteGuard::new(rx);

        assert_eq!(guard.evaluate(&Route::Saved), RouteDecision::Wait);
        tx.send_replace(SessionState::Anonymous);
        assert_eq!(
            guard.evaluate(&Route::Saved),
            RouteDecision::Redirect(Route::Login)
        );
        tx.send_replace(authenticated());
        assert_eq!(guard.evaluate(&Route::Saved), RouteDecision::Allow);
    }

    #[tokio::test]
    async fn test_next_decision_reacts_to_logout() {
        let (tx, rx) = watch::channel(authenticated());
        let mut guard = RouteGuard::new(rx);

        tx.send_replace(SessionState::Anonymous);
        assert_eq!(
            guard.next_decision(&Route::Profile).await,
            Some(RouteDecision::Redirect(Route::Login))
        );

        drop(tx);
        assert_eq!(guard.next_decision(&Route::Profile).await, None);
    }

    #[tokio::test]
    async fn test_settle_waits_out_checking() {
        let (tx, rx) = watch::channel(SessionState::Checking);
        let mut guard = RouteGuard::new(rx);

        let waiter = tokio::spawn(async move {
            let target = Route::Home;
            guard.settle(&target).await
        });
        tx.send_replace(authenticated());

        assert_eq!(waiter.await.unwrap(), RouteDecision::Allow);
    }
}
