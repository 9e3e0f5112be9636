//! Session credentials.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Credentials sent with every request of a session.
///
/// `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Authentication {
    /// API key, sent as `Authorization: Bearer <key>`.
    ApiKey(String),
    /// Account credentials, sent as `Authorization: Basic <base64(user:pass)>`.
    Credential {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
    },
}

impl Authentication {
    /// Authenticate with an API key.
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// Authenticate with a username and password.
    pub fn credential(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Credential {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        match self {
            Self::ApiKey(key) => format!("Bearer {key}"),
            Self::Credential { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                format!("Basic {encoded}")
            }
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            Self::Credential { username, .. } => f
                .debug_struct("Credential")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header() {
        let auth = Authentication::api_key("SG.abc123");
        assert_eq!(auth.authorization_header(), "Bearer SG.abc123");
    }

    #[test]
    fn basic_header() {
        let auth = Authentication::credential("user", "pass");
        assert_eq!(auth.authorization_header(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn debug_hides_secrets() {
        let key = format!("{:?}", Authentication::api_key("SG.abc123"));
        assert!(!key.contains("SG.abc123"));

        let credential = format!("{:?}", Authentication::credential("user", "hunter2"));
        assert!(credential.contains("user"));
        assert!(!credential.contains("hunter2"));
    }
}
