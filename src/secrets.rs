use std::fmt;

use serde::{Deserialize, Serialize};

/// Consumer key and secret, fixed for the lifetime of a flow.
#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new<TKey, TSecret>(key: TKey, secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Credentials {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// An `oauth_token` / `oauth_token_secret` pair.
///
/// Both the short-lived request token and the long-lived access token take
/// this shape. A pair can only be constructed with both halves non-empty, so
/// a partially populated pair is never stored or signed with.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    token: String,
    token_secret: String,
}

impl TokenPair {
    /// Returns `None` unless both halves are present and non-empty.
    pub fn new<TKey, TSecret>(token: TKey, token_secret: TSecret) -> Option<Self>
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        let token = token.into();
        let token_secret = token_secret.into();
        if token.is_empty() || token_secret.is_empty() {
            return None;
        }
        Some(TokenPair {
            token,
            token_secret,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub(crate) fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}
