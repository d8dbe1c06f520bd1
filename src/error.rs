use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type SignResult<T> = std::result::Result<T, SignError>;
pub type ExecuteResult<T> = std::result::Result<T, ExecuteError>;
pub type FlowResult<T> = std::result::Result<T, ErrorResult>;

#[derive(Error, Debug, Clone)]
pub enum SignError {
    #[error("system clock is before the Unix epoch: {0}")]
    Clock(String),
    #[error("HMAC rejected the signing key: {0}")]
    Key(String),
}

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("OAuth sign failed: {0}")]
    Sign(#[from] SignError),
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Terminal failure codes of a handshake attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request-token call returned non-200 or an incomplete token pair.
    TokenRequestFailed,
    /// Callback token missing, mismatched, or no stored request token.
    /// The provider signals this whenever the user declines authorization.
    AccessDenied,
    /// The access-token exchange returned non-200 or an incomplete token pair.
    OauthVerifierError,
    /// The profile fetch failed or carried no unique id.
    VerifyCredentialsError,
    /// Transport-level failure (DNS, TLS, timeout) at any step.
    NetworkError,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::TokenRequestFailed => "token_request_failed",
            ErrorCode::AccessDenied => "access_denied",
            ErrorCode::OauthVerifierError => "oauth_verifier_error",
            ErrorCode::VerifyCredentialsError => "verify_credentials_error",
            ErrorCode::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a failed handshake attempt.
///
/// `raw` carries non-secret context only: a provider response body or the
/// incoming callback parameters. Token secrets never appear here.
#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct ErrorResult {
    pub code: ErrorCode,
    pub message: String,
    pub raw: Value,
}

impl ErrorResult {
    pub(crate) fn new<T>(code: ErrorCode, message: T, raw: Value) -> Self
    where
        T: Into<String>,
    {
        ErrorResult {
            code,
            message: message.into(),
            raw,
        }
    }
}

impl From<ExecuteError> for ErrorResult {
    fn from(err: ExecuteError) -> Self {
        ErrorResult::new(ErrorCode::NetworkError, err.to_string(), Value::Null)
    }
}
