use http::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::FlowConfig;
use crate::error::{ErrorCode, ErrorResult, FlowResult};
use crate::executor::{Executor, RequestSpec};
use crate::profile::{self, NormalizedProfile};
use crate::response::RawResponse;
use crate::secrets::TokenPair;
use crate::store::TokenStore;
use crate::{OAUTH_CALLBACK_KEY, OAUTH_TOKEN_KEY, OAUTH_VERIFIER_KEY};

/// Parameters the provider sends back to the callback endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
}

/// Authorization redirect produced by a successful [`Handshake::start`].
#[derive(Debug, Clone)]
pub struct AuthorizeRedirect {
    pub url: Url,
}

/// Orchestrates the three-legged handshake.
///
/// `start` runs the first leg and leaves the flow awaiting its callback:
/// the request token pair sits in the [`TokenStore`] keyed by the caller's
/// flow id. `callback` consumes that pair exactly once, exchanges the
/// verifier for an access token pair, verifies credentials, and produces a
/// [`NormalizedProfile`]. Every failure is terminal for the attempt; there
/// are no internal retries.
pub struct Handshake<S> {
    config: FlowConfig,
    executor: Executor,
    store: S,
}

impl<S> Handshake<S>
where
    S: TokenStore,
{
    pub fn new(config: FlowConfig, store: S) -> FlowResult<Self> {
        let executor = Executor::new(config.clone()).map_err(ErrorResult::from)?;
        Ok(Handshake {
            config,
            executor,
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// First leg: obtain a request token and build the authorization
    /// redirect URL. The request token pair is stored under `flow_id` until
    /// the provider calls back.
    pub async fn start(&self, flow_id: &str) -> FlowResult<AuthorizeRedirect> {
        let spec = RequestSpec::new(Method::POST, self.config.request_token_url.as_str())
            .param(OAUTH_CALLBACK_KEY, self.config.oauth_callback.as_str());
        let resp = self.executor.execute(&spec, None).await?;
        if !resp.is_success() {
            warn!(status = resp.status.as_u16(), "request token call failed");
            return Err(ErrorResult::new(
                ErrorCode::TokenRequestFailed,
                "request token call failed",
                response_context(&resp),
            ));
        }
        let pair = resp.token_pair().ok_or_else(|| {
            ErrorResult::new(
                ErrorCode::TokenRequestFailed,
                "request token response is missing oauth_token or oauth_token_secret",
                response_context(&resp),
            )
        })?;

        self.store.put(flow_id, pair.clone()).await;
        debug!(flow_id, "request token stored, awaiting callback");

        let mut url = Url::parse(&self.config.authorize_url).map_err(|e| {
            ErrorResult::new(ErrorCode::TokenRequestFailed, e.to_string(), Value::Null)
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(OAUTH_TOKEN_KEY, pair.token());
            if let Some(value) = &self.config.force_login {
                pairs.append_pair("force_login", value);
            }
            if let Some(value) = &self.config.screen_name {
                pairs.append_pair("screen_name", value);
            }
        }
        Ok(AuthorizeRedirect { url })
    }

    /// Second and third legs: validate the callback against the stored
    /// request token pair, exchange the verifier for an access token pair,
    /// and fetch the authenticated user's profile.
    ///
    /// The stored pair is consumed up front, so a replayed callback finds
    /// nothing and is denied. A missing or mismatched `oauth_token` is how
    /// the provider signals user denial, and both map to `access_denied`.
    pub async fn callback(
        &self,
        flow_id: &str,
        params: &CallbackParams,
    ) -> FlowResult<NormalizedProfile> {
        let stored = match self.store.take(flow_id).await {
            Some(pair) => pair,
            None => {
                warn!(flow_id, "no request token stored for this flow");
                return Err(denied("No request token stored for this flow.", params));
            }
        };

        let incoming = params.oauth_token.as_deref().unwrap_or_default();
        if incoming.is_empty() || incoming != stored.token() {
            warn!(flow_id, "callback token missing or mismatched");
            return Err(denied("User denied access.", params));
        }

        // the verifier is mandatory; without it the exchange cannot succeed
        let verifier = match params.oauth_verifier.as_deref() {
            Some(verifier) if !verifier.is_empty() => verifier,
            _ => {
                warn!(flow_id, "callback carries no oauth_verifier");
                return Err(denied("Callback carries no oauth_verifier.", params));
            }
        };
        let spec = RequestSpec::new(Method::POST, self.config.access_token_url.as_str())
            .param(OAUTH_VERIFIER_KEY, verifier);
        let resp = self.executor.execute(&spec, Some(&stored)).await?;
        if !resp.is_success() {
            warn!(status = resp.status.as_u16(), "access token exchange failed");
            return Err(ErrorResult::new(
                ErrorCode::OauthVerifierError,
                "access token exchange failed",
                response_context(&resp),
            ));
        }
        let access = resp.token_pair().ok_or_else(|| {
            ErrorResult::new(
                ErrorCode::OauthVerifierError,
                "access token response is missing oauth_token or oauth_token_secret",
                response_context(&resp),
            )
        })?;

        let raw = self.verify_credentials(&access).await?;
        let profile = profile::normalize(&raw, &access, &self.config.profile).ok_or_else(|| {
            ErrorResult::new(
                ErrorCode::VerifyCredentialsError,
                "verified credentials carry no unique id",
                raw.clone(),
            )
        })?;
        debug!(flow_id, uid = %profile.uid, "handshake completed");
        Ok(profile)
    }

    /// Fourth step: fetch the raw profile payload, signed with the fresh
    /// access token pair.
    async fn verify_credentials(&self, token: &TokenPair) -> FlowResult<Value> {
        let spec = RequestSpec::new(Method::GET, self.config.verify_credentials_url.as_str())
            .params(self.config.verify_params.clone());
        let resp = self.executor.execute(&spec, Some(token)).await?;
        if !resp.is_success() {
            warn!(status = resp.status.as_u16(), "verify credentials call failed");
            return Err(ErrorResult::new(
                ErrorCode::VerifyCredentialsError,
                "credential verification failed",
                response_context(&resp),
            ));
        }
        Ok(resp.to_value())
    }
}

// Raw context for error results: status plus the response body, which never
// contains our secrets.
fn response_context(resp: &RawResponse) -> Value {
    json!({
        "status": resp.status.as_u16(),
        "body": resp.body,
    })
}

fn denied(message: &str, params: &CallbackParams) -> ErrorResult {
    ErrorResult::new(
        ErrorCode::AccessDenied,
        message,
        json!({
            "oauth_token": params.oauth_token,
            "oauth_verifier": params.oauth_verifier,
        }),
    )
}
