use std::collections::HashMap;

use http::StatusCode;
use serde_json::Value;
use url::Url;

use crate::secrets::TokenPair;
use crate::{OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY};

/// Decoded response body, tagged once by wire format at the response boundary.
#[derive(Debug, Clone)]
pub enum ParsedBody {
    /// JSON payload. Holds `Value::Null` when the body failed to decode, so
    /// every downstream field lookup comes back empty.
    Json(Value),
    /// URL-encoded key/value pairs.
    Form(HashMap<String, String>),
}

/// Result of one provider call. Any HTTP status is a normal response here;
/// only connection-level failures are reported as errors by the executor.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
    pub parsed: ParsedBody,
}

impl RawResponse {
    pub(crate) fn new(status: StatusCode, body: String, json: bool) -> Self {
        let parsed = if json {
            ParsedBody::Json(serde_json::from_str(&body).unwrap_or(Value::Null))
        } else {
            ParsedBody::Form(parse_form(&body))
        };
        RawResponse {
            status,
            body,
            parsed,
        }
    }

    // The original protocol treats exactly 200 as success.
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK
    }

    pub fn is_json(&self) -> bool {
        matches!(self.parsed, ParsedBody::Json(_))
    }

    /// Uniform field lookup across both body shapes. JSON numbers and
    /// booleans are stringified; structured values are not.
    pub fn field(&self, name: &str) -> Option<String> {
        match &self.parsed {
            ParsedBody::Json(value) => match value.get(name)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
            ParsedBody::Form(map) => map.get(name).cloned(),
        }
    }

    /// Extract a token pair from the decoded body. Empty fields count as
    /// missing, matching the provider's denial behavior.
    pub fn token_pair(&self) -> Option<TokenPair> {
        let token = self.field(OAUTH_TOKEN_KEY)?;
        let token_secret = self.field(OAUTH_TOKEN_SECRET_KEY)?;
        TokenPair::new(token, token_secret)
    }

    /// The whole decoded payload as JSON, for profile `raw` data.
    pub fn to_value(&self) -> Value {
        match &self.parsed {
            ParsedBody::Json(value) => value.clone(),
            ParsedBody::Form(map) => serde_json::to_value(map).unwrap_or(Value::Null),
        }
    }
}

pub(crate) fn parse_form(text: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str(text).unwrap_or_default()
}

/// A response is decoded as JSON when the content type says so or the
/// endpoint path carries a `.json` suffix.
pub(crate) fn looks_like_json(url: &Url, content_type: Option<&str>) -> bool {
    content_type.map_or(false, |ct| ct.contains("json")) || url.path().ends_with(".json")
}
