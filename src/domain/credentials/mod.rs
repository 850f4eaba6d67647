pub mod pool;

pub use pool::{mask_key, CredentialPool};

use crate::domain::tts::ProviderId;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Shared handle to one provider's pool
pub type SharedPool = Arc<Mutex<CredentialPool>>;

/// Configuration snapshot of one pool; never contains a full key
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub provider: ProviderId,
    pub configured: bool,
    pub key_count: usize,
    pub cursor: usize,
    pub uses_fallback: bool,
    pub masked_keys: Vec<String>,
}

impl PoolStatus {
    pub(crate) fn empty(provider: ProviderId) -> Self {
        Self {
            provider,
            configured: false,
            key_count: 0,
            cursor: 0,
            uses_fallback: false,
            masked_keys: Vec::new(),
        }
    }
}

/// One pool per provider, shared by every job in the process.
///
/// Status reads go through a watch channel, so they never wait on a job
/// holding a pool for its retry cycle.
#[derive(Default)]
pub struct CredentialPools {
    pools: HashMap<ProviderId, SharedPool>,
    statuses: HashMap<ProviderId, watch::Receiver<PoolStatus>>,
}

impl CredentialPools {
    pub fn new(pools: impl IntoIterator<Item = CredentialPool>) -> Self {
        let mut registry = Self::default();
        for pool in pools {
            let provider = pool.provider();
            registry.statuses.insert(provider, pool.subscribe());
            registry.pools.insert(provider, Arc::new(Mutex::new(pool)));
        }
        registry
    }

    pub fn get(&self, provider: ProviderId) -> Option<SharedPool> {
        self.pools.get(&provider).cloned()
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        self.statuses
            .get(&provider)
            .is_some_and(|status| status.borrow().configured)
    }

    pub fn status(&self) -> Vec<PoolStatus> {
        ProviderId::ALL
            .iter()
            .filter_map(|provider| self.statuses.get(provider))
            .map(|status| status.borrow().clone())
            .collect()
    }
}
