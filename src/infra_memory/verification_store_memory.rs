use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredRecord {
    vcode: String,
    retry: u64,
    expire_at: Instant,
}

impl StoredRecord {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expire_at
    }
}

/// Minimum time between two full sweeps of expired records.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Process-local store with the same contract as the Redis store.
/// Expired records are dropped when their login is next touched, and `create`
/// sweeps the whole map at most once per `SWEEP_INTERVAL`.
#[derive(Debug, Clone)]
pub struct MemoryVerificationStore {
    records: Arc<DashMap<String, StoredRecord>>,
    last_sweep: Arc<Mutex<Instant>>,
}

impl Default for MemoryVerificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVerificationStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Drops every expired record.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.records.retain(|_, record| !record.is_expired(now));
    }

    /// Number of stored records, expired ones included until they are touched or swept.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn evict_expired(&self, login: &str, now: Instant) {
        self.records.remove_if(login, |_, record| record.is_expired(now));
    }

    fn sweep_if_due(&self, now: Instant) {
        // A sweep already in progress elsewhere is good enough.
        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return;
        };
        if now.duration_since(*last_sweep) < SWEEP_INTERVAL {
            return;
        }
        *last_sweep = now;
        drop(last_sweep);

        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now));
        debug!(swept = before.saturating_sub(self.records.len()), "expired records swept");
    }
}

#[async_trait::async_trait]
impl VerificationStore for MemoryVerificationStore {
    async fn create(
        &self,
        login: &str,
        vcode: &str,
        ttl_secs: u64,
    ) -> Result<(), VerificationStoreError> {
        validate_new_record(login, vcode, ttl_secs)?;
        let now = Instant::now();
        let expire_at = now
            .checked_add(Duration::from_secs(ttl_secs))
            .ok_or(VerificationStoreError::InvalidTtl)?;
        let record = StoredRecord {
            vcode: vcode.to_string(),
            retry: 0,
            expire_at,
        };

        self.sweep_if_due(now);

        match self.records.entry(login.to_string()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired(now) {
                    return Err(VerificationStoreError::LoginExists);
                }
                occupied.insert(record);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(record);
            }
        }

        debug!(login = %mask_login(login), ttl_secs, "verification code stored");
        Ok(())
    }

    async fn increment_retry(&self, login: &str) -> Result<(), VerificationStoreError> {
        let now = Instant::now();
        let retry = match self.records.get_mut(login) {
            Some(mut record) if !record.is_expired(now) => {
                record.retry += 1;
                Some(record.retry)
            }
            _ => None,
        };

        match retry {
            Some(retry) => {
                debug!(login = %mask_login(login), retry, "retry counted");
                Ok(())
            }
            None => {
                self.evict_expired(login, now);
                Err(VerificationStoreError::LoginNotFound)
            }
        }
    }

    async fn read(&self, login: &str) -> Result<VerificationRecord, VerificationStoreError> {
        let now = Instant::now();
        let found = self
            .records
            .get(login)
            .filter(|record| !record.is_expired(now))
            .map(|record| VerificationRecord {
                vcode: record.vcode.clone(),
                retry: record.retry,
            });

        match found {
            Some(record) => Ok(record),
            None => {
                self.evict_expired(login, now);
                Err(VerificationStoreError::LoginNotFound)
            }
        }
    }

    async fn delete(&self, login: &str) -> Result<(), VerificationStoreError> {
        let removed = self.records.remove(login).is_some();
        debug!(login = %mask_login(login), removed, "verification record deleted");
        Ok(())
    }
}
