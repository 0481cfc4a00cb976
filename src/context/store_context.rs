use crate::domain_port::VerificationStore;
use crate::infra_memory::MemoryVerificationStore;
use crate::infra_redis::{RedisVerificationStore, connect};
use crate::logger::*;
use crate::settings::Settings;
use std::sync::Arc;

/// Handle passed to every caller of the store. Built once at startup.
#[derive(Clone)]
pub struct StoreContext {
    pub store: Arc<dyn VerificationStore>,
}

impl StoreContext {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn VerificationStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryVerificationStore::new()),
            "redis" => {
                let manager = connect(&settings.redis).await?;
                Arc::new(RedisVerificationStore::new(
                    manager,
                    settings.redis.key_prefix.clone(),
                    settings.redis.create_mode,
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };
        info!(backend = %settings.store.backend, "verification store ready");

        Ok(Self { store })
    }

    pub fn from_store(store: Arc<dyn VerificationStore>) -> Self {
        Self { store }
    }
}
