use serde::{Deserialize, Deserializer, Serialize};

/// Profile of the signed-in user as reported by the credential service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable user identifier. The backend may send it as a number or a string.
    #[serde(rename = "id", deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Opaque token proving identity to the remote services.
///
/// Never inspected beyond pass-through. `Debug` is redacted so the value cannot
/// end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for transport or persistence.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// In-memory representation of who is currently using the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub profile: Profile,
    pub credential: Credential,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.profile.user_id
    }
}

/// Lifecycle of the authenticated identity.
///
/// ```text
/// Unknown ──restore──▶ Checking ──▶ Authenticated | Anonymous
/// Authenticated ──reverify──▶ Checking
/// Authenticated ──logout / rejection──▶ Anonymous
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unknown,
    Checking,
    Authenticated(Session),
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// True while the outcome is not known yet (before or during verification).
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Unknown | Self::Checking)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.session().map(|s| &s.profile)
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Checking => "checking",
            Self::Authenticated(_) => "authenticated",
            Self::Anonymous => "anonymous",
        }
    }
}
