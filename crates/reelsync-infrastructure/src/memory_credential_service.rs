//! In-process credential service.
//!
//! Holds identities and issued tokens in memory. Tokens can be expired or
//! narrowed individually and the whole service can be switched offline, which
//! covers every branch the session layer classifies.

use async_trait::async_trait;
use reelsync_core::error::{ReelsyncError, Result};
use reelsync_core::session::{AuthGrant, Credential, CredentialService, Profile};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Identity {
    secret: String,
    profile: Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenStatus {
    Active,
    Expired,
    Narrow,
}

#[derive(Default)]
struct Registry {
    identities: HashMap<String, Identity>,
    tokens: HashMap<String, (String, TokenStatus)>,
    next_user_id: u64,
}

#[derive(Default)]
pub struct InMemoryCredentialService {
    registry: RwLock<Registry>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryCredentialService {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with `Unreachable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of calls that reached the service, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes a previously issued token fail verification with `Expired`.
    pub async fn expire(&self, token: &str) {
        self.set_status(token, TokenStatus::Expired).await;
    }

    /// Makes a previously issued token fail verification with `InsufficientScope`.
    pub async fn narrow(&self, token: &str) {
        self.set_status(token, TokenStatus::Narrow).await;
    }

    /// Issues a token for an existing identity without a password check.
    pub async fn issue(&self, identifier: &str) -> Option<Credential> {
        let mut registry = self.registry.write().await;
        if !registry.identities.contains_key(identifier) {
            return None;
        }
        Some(issue_token(&mut registry, identifier))
    }

    async fn set_status(&self, token: &str, status: TokenStatus) {
        if let Some(entry) = self.registry.write().await.tokens.get_mut(token) {
            entry.1 = status;
        }
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ReelsyncError::unreachable("credential service is offline"));
        }
        Ok(())
    }
}

fn issue_token(registry: &mut Registry, identifier: &str) -> Credential {
    let token = Uuid::new_v4().simple().to_string();
    registry
        .tokens
        .insert(token.clone(), (identifier.to_string(), TokenStatus::Active));
    Credential::new(token)
}

#[async_trait]
impl CredentialService for InMemoryCredentialService {
    async fn create_identity(
        &self,
        identifier: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Profile> {
        self.enter()?;
        let mut registry = self.registry.write().await;
        if registry.identities.contains_key(identifier) {
            return Err(ReelsyncError::IdentityExists);
        }

        registry.next_user_id += 1;
        let profile = Profile {
            user_id: registry.next_user_id.to_string(),
            display_name: display_name.to_string(),
            email: identifier.to_string(),
        };
        registry.identities.insert(
            identifier.to_string(),
            Identity {
                secret: secret.to_string(),
                profile: profile.clone(),
            },
        );
        Ok(profile)
    }

    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<AuthGrant> {
        self.enter()?;
        let mut registry = self.registry.write().await;
        let profile = match registry.identities.get(identifier) {
            Some(identity) if identity.secret == secret => identity.profile.clone(),
            _ => return Err(ReelsyncError::InvalidCredentials),
        };
        let credential = issue_token(&mut registry, identifier);
        Ok(AuthGrant {
            credential,
            profile,
        })
    }

    async fn verify(&self, credential: &Credential) -> Result<Profile> {
        self.enter()?;
        let registry = self.registry.read().await;
        let (identifier, status) = registry
            .tokens
            .get(credential.expose())
            .ok_or(ReelsyncError::Expired)?;
        match status {
            TokenStatus::Expired => Err(ReelsyncError::Expired),
            TokenStatus::Narrow => Err(ReelsyncError::InsufficientScope),
            TokenStatus::Active => registry
                .identities
                .get(identifier)
                .map(|identity| identity.profile.clone())
                .ok_or(ReelsyncError::Expired),
        }
    }

    async fn revoke(&self, credential: &Credential) -> Result<()> {
        self.enter()?;
        self.registry
            .write()
            .await
            .tokens
            .remove(credential.expose());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signup_login_verify() {
        let service = InMemoryCredentialService::new();
        let created = service
            .create_identity("ann@example.com", "pw", "Ann")
            .await
            .unwrap();
        let grant = service.authenticate("ann@example.com", "pw").await.unwrap();

        assert_eq!(grant.profile, created);
        assert_eq!(service.verify(&grant.credential).await.unwrap(), created);
        assert_eq!(service.calls(), 3);
    }

    #[tokio::test]
    async fn test_rejections() {
        let service = InMemoryCredentialService::new();
        service.create_identity("a@b.c", "pw", "A").await.unwrap();

        assert_eq!(
            service.create_identity("a@b.c", "x", "A").await.unwrap_err(),
            ReelsyncError::IdentityExists
        );
        assert_eq!(
            service.authenticate("a@b.c", "wrong").await.unwrap_err(),
            ReelsyncError::InvalidCredentials
        );

        let credential = service.issue("a@b.c").await.unwrap();
        service.expire(credential.expose()).await;
        assert_eq!(
            service.verify(&credential).await.unwrap_err(),
            ReelsyncError::Expired
        );

        let credential = service.issue("a@b.c").await.unwrap();
        service.narrow(credential.expose()).await;
        assert_eq!(
            service.verify(&credential).await.unwrap_err(),
            ReelsyncError::InsufficientScope
        );
    }

    #[tokio::test]
    async fn test_revoked_token_no_longer_verifies() {
        let service = InMemoryCredentialService::new();
        service.create_identity("a@b.c", "pw", "A").await.unwrap();
        let credential = service.issue("a@b.c").await.unwrap();

        service.revoke(&credential).await.unwrap();
        assert_eq!(
            service.verify(&credential).await.unwrap_err(),
            ReelsyncError::Expired
        );
    }

    #[tokio::test]
    async fn test_offline_is_unreachable() {
        let service = InMemoryCredentialService::new();
        service.set_offline(true);
        let err = service.authenticate("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, ReelsyncError::Unreachable(_)));
        assert_eq!(service.calls(), 1);
    }
}
