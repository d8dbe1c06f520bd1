use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::secrets::TokenPair;

/// Session-side storage for the request token pair while the user is away
/// at the provider's authorization page.
///
/// The contract is single-use: `take` is an atomic get-and-delete, so a
/// second `take` for the same flow id returns `None` and a replayed callback
/// cannot re-consume the pair. The store must support concurrent flows with
/// distinct flow ids.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn put(&self, flow_id: &str, pair: TokenPair);

    async fn take(&self, flow_id: &str) -> Option<TokenPair>;
}

/// Process-local store backed by a mutex-guarded map. Suitable for tests and
/// single-process deployments; session- or cache-backed implementations plug
/// in through [`TokenStore`].
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        MemoryTokenStore::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, flow_id: &str, pair: TokenPair) {
        self.entries
            .lock()
            .expect("token store lock poisoned")
            .insert(flow_id.to_owned(), pair);
    }

    async fn take(&self, flow_id: &str) -> Option<TokenPair> {
        self.entries
            .lock()
            .expect("token store lock poisoned")
            .remove(flow_id)
    }
}
