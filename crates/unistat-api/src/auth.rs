use std::fmt;

use secrecy::SecretString;

/// Username/password pair used for the controller's session login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Opaque session token issued by the controller at login.
///
/// The client never parses or inspects it; it lives in the client's cookie
/// jar and rides along on every request after a successful
/// [`authenticate`](crate::SessionClient::authenticate). This handle only
/// exists so callers can tell whether a session is established.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub(crate) fn new(raw: String) -> Self {
        Self(raw)
    }

    /// Raw `Cookie` header value, for diagnostics.
    pub fn as_header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}
