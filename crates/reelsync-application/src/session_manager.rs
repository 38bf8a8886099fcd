//! Session lifecycle.
//!
//! `SessionManager` owns the one in-memory [`SessionState`] of the process,
//! keeps the durable credential in step with it and broadcasts every
//! transition on a `watch` channel. Lifecycle operations are serialized, so a
//! second `restore()` can never interleave with an in-flight login or logout.

use reelsync_core::error::{ReelsyncError, Result};
use reelsync_core::session::{
    Credential, CredentialService, KeyValueStore, Profile, SESSION_TOKEN_KEY, Session,
    SessionState,
};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

/// How a credential check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The credential was accepted; the session is authenticated.
    Verified,
    /// No credential was stored. Nothing was sent over the network.
    NoCredential,
    /// The credential was refused and has been cleared.
    Rejected,
    /// The check could not complete. The stored credential is kept.
    Deferred,
}

/// What happened to the remote session during logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    Revoked,
    /// The server could not be told; local state was cleared anyway.
    RevocationFailed,
    /// There was no credential to revoke.
    NothingToRevoke,
}

impl LogoutOutcome {
    pub fn revoked(&self) -> bool {
        matches!(self, LogoutOutcome::Revoked)
    }
}

#[derive(Default)]
struct Lifecycle {
    restored: Option<VerifyOutcome>,
}

pub struct SessionManager {
    credentials: Arc<dyn CredentialService>,
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
    lifecycle: Mutex<Lifecycle>,
}

impl SessionManager {
    pub fn new(credentials: Arc<dyn CredentialService>, storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            credentials,
            storage,
            state,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<Profile> {
        self.state.borrow().profile().cloned()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.state.borrow().session().map(|s| s.credential.clone())
    }

    /// Returns the active session or `NotAuthenticated`.
    pub fn require_session(&self) -> Result<Session> {
        self.state
            .borrow()
            .session()
            .cloned()
            .ok_or(ReelsyncError::NotAuthenticated)
    }

    // ============================================================================
    // Lifecycle operations
    // ============================================================================

    /// Exchanges an identifier/secret pair for a session.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials`: wrong pair; nothing is persisted
    /// - `Unreachable`: the state is left as it was
    /// - `Storage`: the credential could not be persisted; no transition happens
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Profile> {
        let _lifecycle = self.lifecycle.lock().await;
        self.login_locked(identifier, secret).await
    }

    /// Registers a new identity and signs it in.
    ///
    /// # Errors
    ///
    /// `IdentityExists` if the identifier is taken, plus everything `login` returns.
    pub async fn signup(&self, identifier: &str, secret: &str, display_name: &str) -> Result<Profile> {
        let _lifecycle = self.lifecycle.lock().await;
        let created = self
            .credentials
            .create_identity(identifier, secret, display_name)
            .await?;
        tracing::info!(user_id = %created.user_id, "identity created");
        self.login_locked(identifier, secret).await
    }

    /// Ends the session. Local state is always cleared, online or not.
    pub async fn logout(&self) -> LogoutOutcome {
        let _lifecycle = self.lifecycle.lock().await;

        let credential = match self.credential() {
            Some(credential) => Some(credential),
            None => self.stored_credential().await,
        };

        let outcome = match credential {
            Some(credential) => match self.credentials.revoke(&credential).await {
                Ok(()) => LogoutOutcome::Revoked,
                Err(e) => {
                    tracing::warn!(error = %e, "remote revocation failed, clearing local session anyway");
                    LogoutOutcome::RevocationFailed
                }
            },
            None => LogoutOutcome::NothingToRevoke,
        };

        self.clear_stored_credential().await;
        self.transition(SessionState::Anonymous);
        outcome
    }

    /// Restores the session from the stored credential.
    ///
    /// Runs once per process; later calls return the first outcome without
    /// touching storage or the network.
    pub async fn restore(&self) -> VerifyOutcome {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Some(outcome) = lifecycle.restored {
            tracing::debug!(?outcome, "session already restored");
            return outcome;
        }

        let outcome = self.restore_locked().await;
        lifecycle.restored = Some(outcome);
        outcome
    }

    /// Re-checks the active credential with the service.
    ///
    /// A transient failure puts the previous session back.
    ///
    /// # Errors
    ///
    /// `NotAuthenticated` when there is no active session.
    pub async fn reverify(&self) -> Result<VerifyOutcome> {
        let _lifecycle = self.lifecycle.lock().await;
        let previous = self.require_session()?;

        self.transition(SessionState::Checking);
        let outcome = match self.credentials.verify(&previous.credential).await {
            Ok(profile) => {
                self.transition(SessionState::Authenticated(Session {
                    profile,
                    credential: previous.credential,
                }));
                VerifyOutcome::Verified
            }
            Err(e) if e.is_session_invalidating() => {
                tracing::info!(error = %e, "credential rejected on re-verify");
                self.clear_stored_credential().await;
                self.transition(SessionState::Anonymous);
                VerifyOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "re-verify failed, keeping session");
                self.transition(SessionState::Authenticated(previous));
                VerifyOutcome::Deferred
            }
        };
        Ok(outcome)
    }

    /// Feeds back an error from any remote call made with the session credential.
    ///
    /// Returns true when the error ended the session. Only rejections of the
    /// stored credential count; a failed password exchange does not.
    pub async fn report_failure(&self, error: &ReelsyncError) -> bool {
        if !error.is_credential_rejection() {
            return false;
        }
        let _lifecycle = self.lifecycle.lock().await;
        if !self.state.borrow().is_authenticated() {
            return false;
        }
        tracing::info!(error = %error, "credential rejected by a remote call");
        self.clear_stored_credential().await;
        self.transition(SessionState::Anonymous);
        true
    }

    // ============================================================================
    // Internals (lifecycle lock held)
    // ============================================================================

    async fn login_locked(&self, identifier: &str, secret: &str) -> Result<Profile> {
        match self.credentials.authenticate(identifier, secret).await {
            Ok(grant) => {
                self.storage
                    .set(SESSION_TOKEN_KEY, grant.credential.expose())
                    .await?;
                let profile = grant.profile.clone();
                self.transition(SessionState::Authenticated(Session {
                    profile: grant.profile,
                    credential: grant.credential,
                }));
                Ok(profile)
            }
            Err(ReelsyncError::InvalidCredentials) => {
                if matches!(*self.state.borrow(), SessionState::Unknown) {
                    self.transition(SessionState::Anonymous);
                }
                Err(ReelsyncError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    async fn restore_locked(&self) -> VerifyOutcome {
        if self.state.borrow().is_authenticated() {
            return VerifyOutcome::Verified;
        }

        let Some(credential) = self.stored_credential().await else {
            self.transition(SessionState::Anonymous);
            return VerifyOutcome::NoCredential;
        };

        self.transition(SessionState::Checking);
        match self.credentials.verify(&credential).await {
            Ok(profile) => {
                self.transition(SessionState::Authenticated(Session {
                    profile,
                    credential,
                }));
                VerifyOutcome::Verified
            }
            Err(e) if e.is_session_invalidating() => {
                tracing::info!(error = %e, "stored credential rejected");
                self.clear_stored_credential().await;
                self.transition(SessionState::Anonymous);
                VerifyOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not verify stored credential, continuing anonymously");
                self.transition(SessionState::Anonymous);
                VerifyOutcome::Deferred
            }
        }
    }

    /// Reads the stored credential. Unreadable storage counts as none.
    async fn stored_credential(&self) -> Option<Credential> {
        match self.storage.get(SESSION_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()).map(Credential::new),
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable, treating as signed out");
                None
            }
        }
    }

    async fn clear_stored_credential(&self) {
        if let Err(e) = self.storage.remove(SESSION_TOKEN_KEY).await {
            tracing::warn!(error = %e, "failed to clear stored credential");
        }
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        let current = self.state.borrow();
        if previous.label() != current.label() {
            tracing::info!(from = previous.label(), to = current.label(), "session state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelsync_infrastructure::{InMemoryCredentialService, MemoryKeyValueStore};

    struct Fixture {
        service: Arc<InMemoryCredentialService>,
        storage: Arc<MemoryKeyValueStore>,
        manager: SessionManager,
    }

    fn fixture_with(storage: MemoryKeyValueStore) -> Fixture {
        let service = Arc::new(InMemoryCredentialService::new());
        let storage = Arc::new(storage);
        let manager = SessionManager::new(service.clone(), storage.clone());
        Fixture {
            service,
            storage,
            manager,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryKeyValueStore::new())
    }

    async fn stored_token(fx: &Fixture) -> Option<String> {
        fx.storage.get(SESSION_TOKEN_KEY).await.unwrap()
    }

    /// Storage whose writes fail and whose reads fail on demand.
    struct BrokenStorage {
        fail_reads: bool,
    }

    #[async_trait]
    impl KeyValueStore for BrokenStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            if self.fail_reads {
                Err(ReelsyncError::storage("disk gone"))
            } else {
                Ok(None)
            }
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(ReelsyncError::storage("read-only filesystem"))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(ReelsyncError::storage("read-only filesystem"))
        }
    }

    #[tokio::test]
    async fn test_signup_then_login_authenticates() {
        let fx = fixture();
        let created = fx
            .manager
            .signup("ann@example.com", "pw", "Ann")
            .await
            .unwrap();
        assert!(fx.manager.state().is_authenticated());

        fx.manager.logout().await;
        let profile = fx.manager.login("ann@example.com", "pw").await.unwrap();

        assert_eq!(profile, created);
        assert_eq!(fx.manager.current_user(), Some(created));
        assert!(stored_token(&fx).await.is_some());
        assert_eq!(
            fx.manager.credential().map(|c| c.expose().to_string()),
            stored_token(&fx).await
        );
    }

    #[tokio::test]
    async fn test_signup_existing_identity_fails() {
        let fx = fixture();
        fx.manager.signup("a@b.c", "pw", "A").await.unwrap();
        fx.manager.logout().await;

        let err = fx.manager.signup("a@b.c", "pw", "A").await.unwrap_err();
        assert_eq!(err, ReelsyncError::IdentityExists);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_wrong_password_stays_anonymous_and_persists_nothing() {
        let fx = fixture();
        fx.service.create_identity("a@b.c", "pw", "A").await.unwrap();

        let err = fx.manager.login("a@b.c", "nope").await.unwrap_err();

        assert_eq!(err, ReelsyncError::InvalidCredentials);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(stored_token(&fx).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_login_leaves_state_unchanged() {
        let fx = fixture();
        fx.service.set_offline(true);

        let err = fx.manager.login("a@b.c", "pw").await.unwrap_err();

        assert!(matches!(err, ReelsyncError::Unreachable(_)));
        assert_eq!(fx.manager.state(), SessionState::Unknown);
    }

    #[tokio::test]
    async fn test_login_persist_failure_does_not_transition() {
        let service = Arc::new(InMemoryCredentialService::new());
        service.create_identity("a@b.c", "pw", "A").await.unwrap();
        let manager = SessionManager::new(service, Arc::new(BrokenStorage { fail_reads: false }));

        let err = manager.login("a@b.c", "pw").await.unwrap_err();

        assert!(matches!(err, ReelsyncError::Storage(_)));
        assert_eq!(manager.state(), SessionState::Unknown);
    }

    #[tokio::test]
    async fn test_restore_without_credential_makes_no_network_call() {
        let fx = fixture();

        assert_eq!(fx.manager.restore().await, VerifyOutcome::NoCredential);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(fx.service.calls(), 0);
    }

    #[tokio::test]
    async fn test_restore_with_valid_credential_authenticates() {
        let fx = fixture();
        fx.service.create_identity("a@b.c", "pw", "A").await.unwrap();
        let credential = fx.service.issue("a@b.c").await.unwrap();
        fx.storage
            .set(SESSION_TOKEN_KEY, credential.expose())
            .await
            .unwrap();

        assert_eq!(fx.manager.restore().await, VerifyOutcome::Verified);
        assert_eq!(
            fx.manager.current_user().map(|p| p.email),
            Some("a@b.c".to_string())
        );
    }

    #[tokio::test]
    async fn test_restore_with_expired_credential_clears_storage() {
        let fx = fixture();
        fx.service.create_identity("a@b.c", "pw", "A").await.unwrap();
        let credential = fx.service.issue("a@b.c").await.unwrap();
        fx.service.expire(credential.expose()).await;
        fx.storage
            .set(SESSION_TOKEN_KEY, credential.expose())
            .await
            .unwrap();

        assert_eq!(fx.manager.restore().await, VerifyOutcome::Rejected);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(stored_token(&fx).await, None);
    }

    #[tokio::test]
    async fn test_restore_with_unreachable_service_keeps_credential() {
        let fx = fixture_with(MemoryKeyValueStore::with_entry(SESSION_TOKEN_KEY, "t-1"));
        fx.service.set_offline(true);

        assert_eq!(fx.manager.restore().await, VerifyOutcome::Deferred);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(stored_token(&fx).await.as_deref(), Some("t-1"));
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let fx = fixture_with(MemoryKeyValueStore::with_entry(SESSION_TOKEN_KEY, "t-1"));
        fx.service.set_offline(true);

        assert_eq!(fx.manager.restore().await, VerifyOutcome::Deferred);
        fx.service.set_offline(false);
        assert_eq!(fx.manager.restore().await, VerifyOutcome::Deferred);
        assert_eq!(fx.service.calls(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_storage_restores_anonymous() {
        let service = Arc::new(InMemoryCredentialService::new());
        let manager = SessionManager::new(
            service.clone(),
            Arc::new(BrokenStorage { fail_reads: true }),
        );

        assert_eq!(manager.restore().await, VerifyOutcome::NoCredential);
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_restore_broadcasts_checking_then_result() {
        let fx = fixture();
        fx.service.create_identity("a@b.c", "pw", "A").await.unwrap();
        let credential = fx.service.issue("a@b.c").await.unwrap();
        fx.storage
            .set(SESSION_TOKEN_KEY, credential.expose())
            .await
            .unwrap();

        let mut rx = fx.manager.subscribe();
        assert_eq!(*rx.borrow_and_update(), SessionState::Unknown);

        fx.manager.restore().await;
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_offline_clears_local_state() {
        let fx = fixture();
        fx.manager.signup("a@b.c", "pw", "A").await.unwrap();
        fx.service.set_offline(true);

        let outcome = fx.manager.logout().await;

        assert_eq!(outcome, LogoutOutcome::RevocationFailed);
        assert!(!outcome.revoked());
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(stored_token(&fx).await, None);
        assert_eq!(
            fx.manager.require_session().unwrap_err(),
            ReelsyncError::NotAuthenticated
        );
    }

    #[tokio::test]
    async fn test_logout_revokes_kept_credential_after_deferred_restore() {
        let fx = fixture();
        fx.service.create_identity("a@b.c", "pw", "A").await.unwrap();
        let credential = fx.service.issue("a@b.c").await.unwrap();
        fx.storage
            .set(SESSION_TOKEN_KEY, credential.expose())
            .await
            .unwrap();
        fx.service.set_offline(true);
        assert_eq!(fx.manager.restore().await, VerifyOutcome::Deferred);

        fx.service.set_offline(false);
        assert_eq!(fx.manager.logout().await, LogoutOutcome::Revoked);
        assert_eq!(stored_token(&fx).await, None);
        assert_eq!(
            fx.service.verify(&credential).await.unwrap_err(),
            ReelsyncError::Expired
        );
    }

    #[tokio::test]
    async fn test_logout_without_credential() {
        let fx = fixture();
        assert_eq!(fx.manager.logout().await, LogoutOutcome::NothingToRevoke);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_reverify_outcomes() {
        let fx = fixture();
        fx.manager.signup("a@b.c", "pw", "A").await.unwrap();

        fx.service.set_offline(true);
        assert_eq!(fx.manager.reverify().await.unwrap(), VerifyOutcome::Deferred);
        assert!(fx.manager.state().is_authenticated());

        fx.service.set_offline(false);
        assert_eq!(fx.manager.reverify().await.unwrap(), VerifyOutcome::Verified);

        let token = fx.manager.credential().unwrap();
        fx.service.narrow(token.expose()).await;
        assert_eq!(fx.manager.reverify().await.unwrap(), VerifyOutcome::Rejected);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(stored_token(&fx).await, None);

        assert_eq!(
            fx.manager.reverify().await.unwrap_err(),
            ReelsyncError::NotAuthenticated
        );
    }

    #[tokio::test]
    async fn test_report_failure_only_clears_on_invalidating_errors() {
        let fx = fixture();
        fx.manager.signup("a@b.c", "pw", "A").await.unwrap();

        assert!(
            !fx.manager
                .report_failure(&ReelsyncError::store_unavailable("503"))
                .await
        );
        assert!(fx.manager.state().is_authenticated());

        assert!(fx.manager.report_failure(&ReelsyncError::Expired).await);
        assert_eq!(fx.manager.state(), SessionState::Anonymous);
        assert_eq!(stored_token(&fx).await, None);
    }

    #[tokio::test]
    async fn test_failed_relogin_keeps_existing_session() {
        let fx = fixture();
        fx.manager.signup("a@b.c", "pw", "A").await.unwrap();
        let token = stored_token(&fx).await;
        assert!(token.is_some());

        let err = fx.manager.login("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err, ReelsyncError::InvalidCredentials);
        assert!(!fx.manager.report_failure(&err).await);

        assert!(fx.manager.state().is_authenticated());
        assert_eq!(stored_token(&fx).await, token);
    }
}
