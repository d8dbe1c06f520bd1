use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use http::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use sha1::Sha1;
use url::Url;

use crate::error::{SignError, SignResult};
use crate::secrets::{Credentials, TokenPair};
use crate::{
    OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD_KEY,
    OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERSION_KEY,
};

/// RFC 3986: only unreserved characters survive encoding.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Where the `oauth_*` signing material lands on the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignaturePlacement {
    /// `Authorization: OAuth ...` header (default).
    Header,
    /// Folded into the query string or form body.
    Params,
}

/// Signed material ready to attach to a request.
#[derive(Debug, Clone)]
pub enum SignedMaterial {
    /// Value for the `Authorization` header.
    Header(String),
    /// `oauth_*` parameters, signature included, to merge into the
    /// query string or form body.
    Params(Vec<(String, String)>),
}

/// OAuth 1.0a HMAC-SHA1 request signer.
///
/// Pure with respect to its inputs plus the nonce/timestamp source. A fixed
/// nonce or timestamp makes signatures deterministic for signature checking
/// in tests; nonce reuse is a replay hazard, so never fix them in production.
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    credentials: &'a Credentials,
    nonce: Option<&'a str>,
    timestamp: Option<u64>,
}

impl<'a> Signer<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Signer {
            credentials,
            nonce: None,
            timestamp: None,
        }
    }

    /// Fix the `oauth_nonce` value.
    pub fn nonce(self, nonce: &'a str) -> Self {
        Signer {
            nonce: Some(nonce),
            ..self
        }
    }

    /// Fix the `oauth_timestamp` value.
    pub fn timestamp(self, timestamp: u64) -> Self {
        Signer {
            timestamp: Some(timestamp),
            ..self
        }
    }

    /// Sign one request.
    ///
    /// `url` must carry no query string; query parameters belong in `params`
    /// together with any form body parameters, since both enter the base
    /// string the same way.
    pub fn sign(
        &self,
        method: &Method,
        url: &Url,
        params: &[(String, String)],
        token: Option<&TokenPair>,
        placement: SignaturePlacement,
    ) -> SignResult<SignedMaterial> {
        let nonce = match self.nonce {
            Some(fixed) => fixed.to_string(),
            None => generate_nonce(),
        };
        let timestamp = match self.timestamp {
            Some(fixed) => fixed,
            None => unix_timestamp()?,
        };

        let mut oauth: Vec<(String, String)> = vec![
            (OAUTH_CONSUMER_KEY.into(), self.credentials.key().into()),
            (OAUTH_NONCE_KEY.into(), nonce),
            (OAUTH_SIGNATURE_METHOD_KEY.into(), SIGNATURE_METHOD.into()),
            (OAUTH_TIMESTAMP_KEY.into(), timestamp.to_string()),
            (OAUTH_VERSION_KEY.into(), OAUTH_VERSION.into()),
        ];
        if let Some(pair) = token {
            oauth.push((OAUTH_TOKEN_KEY.into(), pair.token().into()));
        }

        let mut all: Vec<(String, String)> = params.to_vec();
        all.extend(oauth.iter().cloned());
        let base = base_string(method, url, &all);

        let key = signing_key(self.credentials, token);
        let signature = hmac_sha1(&key, &base)?;
        oauth.push((OAUTH_SIGNATURE_KEY.into(), signature));

        Ok(match placement {
            SignaturePlacement::Header => SignedMaterial::Header(authorization_header(&oauth)),
            SignaturePlacement::Params => SignedMaterial::Params(oauth),
        })
    }
}

/// Percent-encode per RFC 3986 unreserved-character rules.
pub(crate) fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Canonical signature base string: uppercase method, encoded base URL with
/// query and fragment stripped, and the encoded, sorted parameter string.
pub(crate) fn base_string(method: &Method, url: &Url, params: &[(String, String)]) -> String {
    let mut base_url = url.clone();
    base_url.set_query(None);
    base_url.set_fragment(None);

    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str().to_uppercase(),
        percent_encode(base_url.as_str()),
        percent_encode(&param_string)
    )
}

fn signing_key(credentials: &Credentials, token: Option<&TokenPair>) -> String {
    format!(
        "{}&{}",
        percent_encode(credentials.secret()),
        percent_encode(token.map(|t| t.token_secret()).unwrap_or_default())
    )
}

fn authorization_header(oauth: &[(String, String)]) -> String {
    let fields = oauth
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("OAuth {}", fields)
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn unix_timestamp() -> SignResult<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| SignError::Clock(e.to_string()))
}

fn hmac_sha1(key: &str, data: &str) -> SignResult<String> {
    let mut mac =
        Hmac::<Sha1>::new_from_slice(key.as_bytes()).map_err(|e| SignError::Key(e.to_string()))?;
    mac.update(data.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn header_value(material: SignedMaterial) -> String {
        match material {
            SignedMaterial::Header(value) => value,
            SignedMaterial::Params(_) => panic!("expected header placement"),
        }
    }

    #[test]
    fn percent_encoding_keeps_unreserved_characters() {
        assert_eq!(percent_encode("hello world"), "hello%20world");
        assert_eq!(percent_encode("foo=bar&baz"), "foo%3Dbar%26baz");
        assert_eq!(percent_encode("test-value_123.txt"), "test-value_123.txt");
        assert_eq!(percent_encode("~tilde"), "~tilde");
        assert_eq!(percent_encode("少女"), "%E5%B0%91%E5%A5%B3");
    }

    #[test]
    fn generated_nonces_are_fresh() {
        let first = generate_nonce();
        let second = generate_nonce();
        assert_ne!(first, second);
        assert_eq!(first.len(), 32);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    // Reference vector from the Twitter API signature documentation.
    #[test]
    fn base_string_and_signature_match_reference_vector() {
        let credentials = Credentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
        );
        let token = TokenPair::new(
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        )
        .unwrap();
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json").unwrap();
        let params = pairs(&[
            ("include_entities", "true"),
            ("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
        ]);

        let nonce = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
        let all = {
            let mut all = params.clone();
            all.extend(pairs(&[
                ("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
                ("oauth_nonce", nonce),
                ("oauth_signature_method", "HMAC-SHA1"),
                ("oauth_timestamp", "1318622958"),
                ("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
                ("oauth_version", "1.0"),
            ]));
            all
        };
        assert_eq!(
            base_string(&Method::POST, &url, &all),
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
             include_entities%3Dtrue%26\
             oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
             oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
             oauth_signature_method%3DHMAC-SHA1%26\
             oauth_timestamp%3D1318622958%26\
             oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
             oauth_version%3D1.0%26\
             status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );

        let signed = Signer::new(&credentials)
            .nonce(nonce)
            .timestamp(1_318_622_958)
            .sign(
                &Method::POST,
                &url,
                &params,
                Some(&token),
                SignaturePlacement::Header,
            )
            .unwrap();
        let header = header_value(signed);
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
    }

    #[test]
    fn fixed_nonce_and_timestamp_give_deterministic_signatures() {
        let credentials = Credentials::new("key", "secret");
        let url = Url::parse("https://provider.example/oauth/request_token").unwrap();
        let params = pairs(&[("oauth_callback", "https://client.example/cb")]);
        let sign = |timestamp: u64| {
            header_value(
                Signer::new(&credentials)
                    .nonce("fixed-nonce")
                    .timestamp(timestamp)
                    .sign(
                        &Method::POST,
                        &url,
                        &params,
                        None,
                        SignaturePlacement::Header,
                    )
                    .unwrap(),
            )
        };
        assert_eq!(sign(1_000_000), sign(1_000_000));
        assert_ne!(sign(1_000_000), sign(1_000_001));
    }

    #[test]
    fn params_placement_exposes_signature_as_parameters() {
        let credentials = Credentials::new("key", "secret");
        let url = Url::parse("https://provider.example/oauth/request_token").unwrap();
        let signed = Signer::new(&credentials)
            .nonce("n")
            .timestamp(1)
            .sign(&Method::POST, &url, &[], None, SignaturePlacement::Params)
            .unwrap();
        match signed {
            SignedMaterial::Params(oauth) => {
                assert!(oauth.iter().any(|(k, _)| k == OAUTH_SIGNATURE_KEY));
                assert!(oauth.iter().any(|(k, v)| k == OAUTH_CONSUMER_KEY && v == "key"));
            }
            SignedMaterial::Header(_) => panic!("expected params placement"),
        }
    }

    #[test]
    fn token_secret_enters_the_signing_key() {
        let credentials = Credentials::new("key", "consumer-secret");
        let token = TokenPair::new("tok", "token-secret").unwrap();
        assert_eq!(
            signing_key(&credentials, Some(&token)),
            "consumer-secret&token-secret"
        );
        assert_eq!(signing_key(&credentials, None), "consumer-secret&");
    }
}
