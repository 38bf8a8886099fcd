//! HTTP adapters for the remote services.

mod credential_client;
mod document_client;
mod tmdb_client;

pub use credential_client::HttpCredentialService;
pub use document_client::HttpDocumentStore;
pub use tmdb_client::TmdbCatalog;

use reelsync_core::error::{ReelsyncError, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Builds the shared HTTP client. No timeout is applied unless configured.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ReelsyncError::internal(format!("failed to build HTTP client: {e}")))
}

/// Joins a base URL and a path without doubling or dropping slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Reads the human-readable message from an error response.
///
/// Services answer with `{"error": ".."}` or `{"message": ".."}`; anything
/// else falls back to the raw body, then to the status text.
pub(crate) async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    message_from_body(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body
        }
    })
}

fn message_from_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:5000/", "/api/auth/me"),
            "http://localhost:5000/api/auth/me"
        );
        assert_eq!(join_url("http://h/v1", "databases"), "http://h/v1/databases");
    }

    #[test]
    fn test_message_from_body() {
        assert_eq!(
            message_from_body(r#"{"error": "Email already exists"}"#).as_deref(),
            Some("Email already exists")
        );
        assert_eq!(
            message_from_body(r#"{"message": "Document not found", "code": 404}"#).as_deref(),
            Some("Document not found")
        );
        assert_eq!(message_from_body("<html>502</html>"), None);
    }

    #[test]
    fn test_build_client_with_and_without_timeout() {
        assert!(build_client(None).is_ok());
        assert!(build_client(Some(Duration::from_secs(5))).is_ok());
    }
}
