use std::time::Duration;

use crate::secrets::Credentials;
use crate::signer::SignaturePlacement;

pub const TWITTER_REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";
pub const TWITTER_AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authenticate";
pub const TWITTER_ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";
pub const TWITTER_VERIFY_CREDENTIALS_URL: &str =
    "https://api.twitter.com/1.1/account/verify_credentials.json";
pub const TWITTER_PROFILE_URL_TEMPLATE: &str = "https://twitter.com/{screen_name}";

/// Proxy endpoint with optional `user:password` credentials.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub basic_auth: Option<(String, String)>,
}

/// Source-field names used to normalize the verify-credentials payload,
/// plus the profile URL synthesized from the nickname.
#[derive(Debug, Clone)]
pub struct ProfileFields {
    pub uid: String,
    pub name: String,
    pub nickname: String,
    pub location: String,
    pub description: String,
    pub image: String,
    pub website: String,
    /// `{screen_name}` is replaced with the nickname field value.
    pub profile_url_template: String,
    /// Key under which the synthesized profile URL lands in `info.urls`.
    pub profile_url_key: String,
}

impl Default for ProfileFields {
    fn default() -> Self {
        ProfileFields {
            uid: "id".into(),
            name: "name".into(),
            nickname: "screen_name".into(),
            location: "location".into(),
            description: "description".into(),
            image: "profile_image_url".into(),
            website: "url".into(),
            profile_url_template: TWITTER_PROFILE_URL_TEMPLATE.into(),
            profile_url_key: "twitter".into(),
        }
    }
}

/// Full configuration surface of one handshake flow.
///
/// Consumer key/secret and the callback URL are required; everything else
/// carries the provider defaults and can be overridden, including every
/// endpoint URL for testing against a mock provider.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub(crate) credentials: Credentials,
    pub(crate) oauth_callback: String,
    pub(crate) request_token_url: String,
    pub(crate) authorize_url: String,
    pub(crate) access_token_url: String,
    pub(crate) verify_credentials_url: String,
    pub(crate) verify_params: Vec<(String, String)>,
    pub(crate) force_login: Option<String>,
    pub(crate) screen_name: Option<String>,
    pub(crate) connect_timeout: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) verify_tls: bool,
    pub(crate) follow_redirects: bool,
    pub(crate) proxy: Option<ProxyConfig>,
    pub(crate) placement: SignaturePlacement,
    pub(crate) fixed_nonce: Option<String>,
    pub(crate) fixed_timestamp: Option<u64>,
    pub(crate) profile: ProfileFields,
}

impl FlowConfig {
    pub fn new<TKey, TSecret, TCallback>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        oauth_callback: TCallback,
    ) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
        TCallback: Into<String>,
    {
        FlowConfig {
            credentials: Credentials::new(consumer_key, consumer_secret),
            oauth_callback: oauth_callback.into(),
            request_token_url: TWITTER_REQUEST_TOKEN_URL.into(),
            authorize_url: TWITTER_AUTHORIZE_URL.into(),
            access_token_url: TWITTER_ACCESS_TOKEN_URL.into(),
            verify_credentials_url: TWITTER_VERIFY_CREDENTIALS_URL.into(),
            verify_params: vec![("skip_status".into(), "true".into())],
            force_login: None,
            screen_name: None,
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            verify_tls: true,
            follow_redirects: false,
            proxy: None,
            placement: SignaturePlacement::Header,
            fixed_nonce: None,
            fixed_timestamp: None,
            profile: ProfileFields::default(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn request_token_url<T: Into<String>>(self, url: T) -> Self {
        FlowConfig {
            request_token_url: url.into(),
            ..self
        }
    }

    pub fn authorize_url<T: Into<String>>(self, url: T) -> Self {
        FlowConfig {
            authorize_url: url.into(),
            ..self
        }
    }

    pub fn access_token_url<T: Into<String>>(self, url: T) -> Self {
        FlowConfig {
            access_token_url: url.into(),
            ..self
        }
    }

    pub fn verify_credentials_url<T: Into<String>>(self, url: T) -> Self {
        FlowConfig {
            verify_credentials_url: url.into(),
            ..self
        }
    }

    /// Extra parameters sent with the verify-credentials call.
    /// Defaults to `skip_status=true`.
    pub fn verify_params(self, params: Vec<(String, String)>) -> Self {
        FlowConfig {
            verify_params: params,
            ..self
        }
    }

    /// Ask the provider to force a fresh login on the authorization page.
    pub fn force_login<T: Into<String>>(self, value: T) -> Self {
        FlowConfig {
            force_login: Some(value.into()),
            ..self
        }
    }

    /// Pre-fill the provider's authorization page with this handle.
    pub fn screen_name<T: Into<String>>(self, value: T) -> Self {
        FlowConfig {
            screen_name: Some(value.into()),
            ..self
        }
    }

    pub fn connect_timeout(self, timeout: Duration) -> Self {
        FlowConfig {
            connect_timeout: timeout,
            ..self
        }
    }

    pub fn request_timeout(self, timeout: Duration) -> Self {
        FlowConfig {
            request_timeout: timeout,
            ..self
        }
    }

    /// Disable TLS certificate verification. Only for testing against a
    /// provider with a self-signed certificate.
    pub fn danger_disable_tls_verification(self) -> Self {
        FlowConfig {
            verify_tls: false,
            ..self
        }
    }

    /// Follow HTTP redirects. Off by default; OAuth endpoints do not
    /// expect it.
    pub fn follow_redirects(self, follow: bool) -> Self {
        FlowConfig {
            follow_redirects: follow,
            ..self
        }
    }

    pub fn proxy(self, proxy: ProxyConfig) -> Self {
        FlowConfig {
            proxy: Some(proxy),
            ..self
        }
    }

    /// Where the signing material is placed. Defaults to the
    /// `Authorization` header.
    pub fn signature_placement(self, placement: SignaturePlacement) -> Self {
        FlowConfig {
            placement,
            ..self
        }
    }

    /// Fix the `oauth_nonce` value for deterministic signatures.
    /// Never set this in production; nonce reuse is a replay hazard.
    pub fn fixed_nonce<T: Into<String>>(self, nonce: T) -> Self {
        FlowConfig {
            fixed_nonce: Some(nonce.into()),
            ..self
        }
    }

    /// Fix the `oauth_timestamp` value for deterministic signatures.
    /// Never set this in production.
    pub fn fixed_timestamp(self, timestamp: u64) -> Self {
        FlowConfig {
            fixed_timestamp: Some(timestamp),
            ..self
        }
    }

    pub fn profile_fields(self, profile: ProfileFields) -> Self {
        FlowConfig { profile, ..self }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_point_at_twitter() {
        let config = FlowConfig::new("key", "secret", "https://client.example/cb");
        assert_eq!(config.request_token_url, TWITTER_REQUEST_TOKEN_URL);
        assert_eq!(config.authorize_url, TWITTER_AUTHORIZE_URL);
        assert_eq!(config.access_token_url, TWITTER_ACCESS_TOKEN_URL);
        assert_eq!(config.verify_credentials_url, TWITTER_VERIFY_CREDENTIALS_URL);
        assert_eq!(
            config.verify_params,
            vec![("skip_status".to_string(), "true".to_string())]
        );
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.verify_tls);
        assert!(!config.follow_redirects);
        assert_eq!(config.placement, SignaturePlacement::Header);
    }

    #[test]
    fn builder_overrides_endpoints() {
        let config = FlowConfig::new("key", "secret", "https://client.example/cb")
            .request_token_url("http://127.0.0.1:9999/oauth/request_token")
            .force_login("true")
            .screen_name("alice");
        assert_eq!(
            config.request_token_url,
            "http://127.0.0.1:9999/oauth/request_token"
        );
        assert_eq!(config.force_login.as_deref(), Some("true"));
        assert_eq!(config.screen_name.as_deref(), Some("alice"));
    }
}
