//! Credential service over the backend's `/api/auth` routes.

use super::{error_message, join_url};
use async_trait::async_trait;
use reelsync_core::error::{ReelsyncError, Result};
use reelsync_core::session::{AuthGrant, Credential, CredentialService, Profile};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct GrantResponse {
    user: Profile,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: Profile,
}

/// Which call a response belongs to; decides what a 401 means.
#[derive(Debug, Clone, Copy)]
enum Call {
    Signup,
    Login,
    Verify,
    Logout,
}

pub struct HttpCredentialService {
    client: Client,
    base_url: String,
}

impl HttpCredentialService {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, route: &str) -> String {
        join_url(&self.base_url, &format!("api/auth/{route}"))
    }

    async fn send(&self, call: Call, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(?call, error = %e, "credential service request failed");
            ReelsyncError::unreachable(e.to_string())
        })?;

        if response.status().is_success() {
            return Ok(response);
        }
        Err(rejection(call, response).await)
    }
}

async fn rejection(call: Call, response: Response) -> ReelsyncError {
    let status = response.status();
    match (status, call) {
        (StatusCode::UNAUTHORIZED, Call::Login) => ReelsyncError::InvalidCredentials,
        (StatusCode::UNAUTHORIZED, _) => ReelsyncError::Expired,
        (StatusCode::FORBIDDEN, _) => ReelsyncError::InsufficientScope,
        (StatusCode::CONFLICT, Call::Signup) => ReelsyncError::IdentityExists,
        _ => ReelsyncError::rejected(status.as_u16(), error_message(response).await),
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status().as_u16();
    response
        .json::<T>()
        .await
        .map_err(|e| ReelsyncError::rejected(status, format!("malformed response: {e}")))
}

#[async_trait]
impl CredentialService for HttpCredentialService {
    async fn create_identity(
        &self,
        identifier: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Profile> {
        let request = self.client.post(self.url("signup")).json(&SignupRequest {
            email: identifier,
            password: secret,
            name: display_name,
        });
        let grant: GrantResponse = decode(self.send(Call::Signup, request).await?).await?;
        Ok(grant.user)
    }

    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<AuthGrant> {
        let request = self.client.post(self.url("login")).json(&LoginRequest {
            email: identifier,
            password: secret,
        });
        let grant: GrantResponse = decode(self.send(Call::Login, request).await?).await?;
        Ok(AuthGrant {
            credential: Credential::new(grant.token),
            profile: grant.user,
        })
    }

    async fn verify(&self, credential: &Credential) -> Result<Profile> {
        let request = self
            .client
            .get(self.url("me"))
            .bearer_auth(credential.expose());
        let body: ProfileResponse = decode(self.send(Call::Verify, request).await?).await?;
        Ok(body.user)
    }

    async fn revoke(&self, credential: &Credential) -> Result<()> {
        let request = self
            .client
            .post(self.url("logout"))
            .bearer_auth(credential.expose())
            .json(&serde_json::json!({}));
        self.send(Call::Logout, request).await?;
        Ok(())
    }
}
