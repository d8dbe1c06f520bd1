/*!
oauth1-handshake: the three-legged OAuth 1.0a flow as a library.

# Overview

This crate runs the full OAuth 1.0a authentication handshake against a
provider: obtain a request token, send the user to the authorization page,
exchange the returned verifier for an access token, and fetch the
authenticated user's profile in a normalized shape. Requests are signed with
HMAC-SHA1 and issued through [reqwest](https://crates.io/crates/reqwest).

The hosting web framework stays in charge of routing and sessions. It hands
this crate a flow id and the callback parameters; the crate hands back a
redirect URL or a [`NormalizedProfile`]. The request token pair held between
the two legs lives behind the [`TokenStore`] contract, so any session backend
can carry it.

Defaults target Twitter, matching the strategy this crate grew out of, and
every endpoint URL can be overridden for other providers or a mock server.

# How to use

```no_run
use oauth1_handshake::{CallbackParams, FlowConfig, Handshake, MemoryTokenStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FlowConfig::new(
        "[CONSUMER_KEY]",
        "[CONSUMER_SECRET]",
        "https://my.app/auth/twitter/callback",
    );
    let handshake = Handshake::new(config, MemoryTokenStore::new())?;

    // leg 1: acquire a request token and send the user away
    let redirect = handshake.start("session-1").await?;
    println!("redirect the user to: {}", redirect.url);

    // leg 3: the provider calls back with oauth_token & oauth_verifier
    let params = CallbackParams {
        oauth_token: Some("[RETURNED_TOKEN]".into()),
        oauth_verifier: Some("[VERIFIER]".into()),
    };
    let profile = handshake.callback("session-1", &params).await?;
    println!("authenticated uid: {}", profile.uid);
    Ok(())
}
```

Failures carry a stable code from the error taxonomy (`token_request_failed`,
`access_denied`, `oauth_verifier_error`, `verify_credentials_error`,
`network_error`) plus non-secret raw context for logging.
*/
mod config;
mod error;
mod executor;
mod handshake;
mod profile;
mod response;
mod secrets;
mod signer;
mod store;

// exposed to external program
pub use config::{
    FlowConfig, ProfileFields, ProxyConfig, TWITTER_ACCESS_TOKEN_URL, TWITTER_AUTHORIZE_URL,
    TWITTER_PROFILE_URL_TEMPLATE, TWITTER_REQUEST_TOKEN_URL, TWITTER_VERIFY_CREDENTIALS_URL,
};
pub use error::{
    ErrorCode, ErrorResult, ExecuteError, ExecuteResult, FlowResult, SignError, SignResult,
};
pub use executor::{Executor, RequestSpec};
pub use handshake::{AuthorizeRedirect, CallbackParams, Handshake};
pub use profile::{NormalizedProfile, ProfileCredentials, ProfileInfo};
pub use response::{ParsedBody, RawResponse};
pub use secrets::{Credentials, TokenPair};
pub use signer::{SignaturePlacement, SignedMaterial, Signer};
pub use store::{MemoryTokenStore, TokenStore};

// exposed constant variables
/// Represents `oauth_callback`.
pub const OAUTH_CALLBACK_KEY: &str = "oauth_callback";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_verifier`.
pub const OAUTH_VERIFIER_KEY: &str = "oauth_verifier";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";

// crate-private constant variables
pub(crate) const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
pub(crate) const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
pub(crate) const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub(crate) const OAUTH_TOKEN_KEY: &str = "oauth_token";
pub(crate) const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
