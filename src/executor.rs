use http::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{redirect, Client};
use tracing::debug;
use url::Url;

use crate::config::FlowConfig;
use crate::error::ExecuteResult;
use crate::response::{self, RawResponse};
use crate::secrets::TokenPair;
use crate::signer::{SignedMaterial, Signer};

/// One outbound provider call.
///
/// `url` must carry no query string of its own; `params` land on the query
/// string for GET and in the form body otherwise, and enter the signature
/// base string either way.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub use_auth: bool,
}

impl RequestSpec {
    pub fn new<T: Into<String>>(method: Method, url: T) -> Self {
        RequestSpec {
            method,
            url: url.into(),
            params: Vec::new(),
            use_auth: true,
        }
    }

    pub fn param<TKey, TValue>(mut self, key: TKey, value: TValue) -> Self
    where
        TKey: Into<String>,
        TValue: Into<String>,
    {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn params(mut self, params: Vec<(String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.use_auth = false;
        self
    }
}

/// Issues signed HTTP calls against the provider.
///
/// Every HTTP status comes back as a [`RawResponse`]; only connection-level
/// failures (DNS, TLS, timeout) surface as errors.
pub struct Executor {
    client: Client,
    config: FlowConfig,
}

impl Executor {
    pub fn new(config: FlowConfig) -> ExecuteResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .redirect(if config.follow_redirects {
                redirect::Policy::default()
            } else {
                redirect::Policy::none()
            });
        if let Some(proxy_config) = &config.proxy {
            let mut proxy = reqwest::Proxy::all(&proxy_config.url)?;
            if let Some((user, password)) = &proxy_config.basic_auth {
                proxy = proxy.basic_auth(user, password);
            }
            builder = builder.proxy(proxy);
        }
        Ok(Executor {
            client: builder.build()?,
            config,
        })
    }

    pub async fn execute(
        &self,
        spec: &RequestSpec,
        token: Option<&TokenPair>,
    ) -> ExecuteResult<RawResponse> {
        let mut url = Url::parse(&spec.url)?;
        let on_query = spec.method == Method::GET || spec.method == Method::HEAD;

        let mut query: Vec<(String, String)> = Vec::new();
        let mut form: Vec<(String, String)> = Vec::new();
        if on_query {
            query = spec.params.clone();
        } else {
            form = spec.params.clone();
        }

        let mut auth_header = None;
        if spec.use_auth {
            let mut signer = Signer::new(self.config.credentials());
            if let Some(nonce) = &self.config.fixed_nonce {
                signer = signer.nonce(nonce);
            }
            if let Some(timestamp) = self.config.fixed_timestamp {
                signer = signer.timestamp(timestamp);
            }
            match signer.sign(
                &spec.method,
                &url,
                &spec.params,
                token,
                self.config.placement,
            )? {
                SignedMaterial::Header(value) => auth_header = Some(value),
                SignedMaterial::Params(oauth) => {
                    if on_query {
                        query.extend(oauth);
                    } else {
                        form.extend(oauth);
                    }
                }
            }
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &query {
                pairs.append_pair(key, value);
            }
        }

        let mut request = self.client.request(spec.method.clone(), url.clone());
        if let Some(value) = auth_header {
            request = request.header(AUTHORIZATION, value);
        }
        if !on_query {
            request = request.form(&form);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp.text().await?;
        debug!(
            status = status.as_u16(),
            path = url.path(),
            "provider responded"
        );

        let json = response::looks_like_json(&url, content_type.as_deref());
        Ok(RawResponse::new(status, body, json))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spec_builder_accumulates_params() {
        let spec = RequestSpec::new(Method::POST, "https://provider.example/oauth/request_token")
            .param("oauth_callback", "https://client.example/cb")
            .params(vec![("skip_status".into(), "true".into())]);
        assert!(spec.use_auth);
        assert_eq!(spec.params.len(), 2);
        assert!(!spec.clone().unsigned().use_auth);
    }
}
