//! Credential service contract.

use super::model::{Credential, Profile};
use crate::error::Result;
use async_trait::async_trait;

/// Result of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub credential: Credential,
    pub profile: Profile,
}

/// Remote service that owns identities and issues credentials.
///
/// Implementations map transport failures to `ReelsyncError::Unreachable` and
/// service rejections to the dedicated error kinds, so callers never have to
/// look at message text.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Registers a new identity.
    ///
    /// # Errors
    ///
    /// - `IdentityExists` when the identifier is already registered
    /// - `Unreachable` / `Rejected` for any other failure
    async fn create_identity(
        &self,
        identifier: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Profile>;

    /// Exchanges an identifier/secret pair for a credential.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` when the pair is wrong
    /// - `Unreachable` on transport failure
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<AuthGrant>;

    /// Checks that a stored credential is still accepted.
    ///
    /// # Errors
    ///
    /// - `Expired` / `InsufficientScope` when the credential is rejected
    /// - `Unreachable` on transport failure
    async fn verify(&self, credential: &Credential) -> Result<Profile>;

    /// Revokes the credential on the server. Best effort.
    async fn revoke(&self, credential: &Credential) -> Result<()>;
}
