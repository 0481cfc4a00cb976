use crate::domain_model::*;
use crate::domain_port::*;
use anyhow::anyhow;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};
use serde::Deserialize;
use tracing::{debug, warn};

const CREATE_RECORD: &str = include_str!("create_record.lua");
const INCREMENT_RETRY: &str = include_str!("increment_retry.lua");

/// How `create` attaches the expiration to a new record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateMode {
    /// HSETNX and EXPIRE in one Lua script.
    #[default]
    Atomic,
    /// HSETNX followed by a separate EXPIRE. A failure between the two calls
    /// leaves a record without expiration that must be deleted by hand.
    TwoStep,
}

pub struct RedisVerificationStore {
    conn: ConnectionManager,
    prefix: String,
    create_mode: CreateMode,
    create_script: Script,
    increment_script: Script,
}

impl RedisVerificationStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, create_mode: CreateMode) -> Self {
        RedisVerificationStore {
            conn,
            prefix: prefix.into(),
            create_mode,
            create_script: Script::new(CREATE_RECORD),
            increment_script: Script::new(INCREMENT_RETRY),
        }
    }

    fn key(&self, login: &str) -> String {
        record_key(&self.prefix, login)
    }
}

fn record_key(prefix: &str, login: &str) -> String {
    if prefix.is_empty() {
        login.to_string()
    } else {
        format!("{}:{}", prefix, login)
    }
}

fn parse_retry(raw: Option<&str>) -> Result<u64, VerificationStoreError> {
    match raw {
        None => Ok(0),
        Some(s) => s
            .parse::<u64>()
            .map_err(|e| VerificationStoreError::Decode(format!("{:?}: {}", s, e))),
    }
}

/// Maps the create script reply: 1 created, 0 code already stored.
fn create_outcome(status: i64) -> Result<(), VerificationStoreError> {
    match status {
        1 => Ok(()),
        0 => Err(VerificationStoreError::LoginExists),
        other => Err(VerificationStoreError::Internal(anyhow!(
            "unknown script status: {}",
            other
        ))),
    }
}

/// Maps the increment script reply: nil when no code is stored, otherwise the new counter.
fn increment_outcome(reply: Option<i64>) -> Result<u64, VerificationStoreError> {
    match reply {
        None => Err(VerificationStoreError::LoginNotFound),
        Some(n) if n > 0 => Ok(n as u64),
        Some(n) => Err(VerificationStoreError::Internal(anyhow!(
            "unexpected retry counter: {}",
            n
        ))),
    }
}

#[async_trait::async_trait]
impl VerificationStore for RedisVerificationStore {
    async fn create(
        &self,
        login: &str,
        vcode: &str,
        ttl_secs: u64,
    ) -> Result<(), VerificationStoreError> {
        validate_new_record(login, vcode, ttl_secs)?;
        let ttl = i64::try_from(ttl_secs).map_err(|_| VerificationStoreError::InvalidTtl)?;
        let key = &self.key(login);
        let mut conn = self.conn.clone();

        match self.create_mode {
            CreateMode::Atomic => {
                let status: i64 = self
                    .create_script
                    .key(key)
                    .arg(vcode)
                    .arg(ttl)
                    .invoke_async(&mut conn)
                    .await
                    .map_err(|e| VerificationStoreError::Backend(e.to_string()))?;
                create_outcome(status).inspect_err(|e| {
                    if e.is_infra() {
                        warn!(login = %mask_login(login), "{}", e);
                    }
                })?;
            }
            CreateMode::TwoStep => {
                let created: bool = conn
                    .hset_nx(key, FIELD_VCODE, vcode)
                    .await
                    .map_err(|e| VerificationStoreError::Backend(e.to_string()))?;
                if !created {
                    return Err(VerificationStoreError::LoginExists);
                }
                let expiring: bool = conn
                    .expire(key, ttl)
                    .await
                    .map_err(|e| VerificationStoreError::Backend(e.to_string()))?;
                if !expiring {
                    // Deleted between HSETNX and EXPIRE.
                    warn!(login = %mask_login(login), "record vanished before expiration was set");
                }
            }
        }

        debug!(login = %mask_login(login), ttl_secs, "verification code stored");
        Ok(())
    }

    async fn increment_retry(&self, login: &str) -> Result<(), VerificationStoreError> {
        let key = &self.key(login);
        let mut conn = self.conn.clone();
        let reply: Option<i64> = self
            .increment_script
            .key(key)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| VerificationStoreError::Backend(e.to_string()))?;

        let retry = increment_outcome(reply).inspect_err(|e| {
            if e.is_infra() {
                warn!(login = %mask_login(login), "{}", e);
            }
        })?;
        debug!(login = %mask_login(login), retry, "retry counted");
        Ok(())
    }

    async fn read(&self, login: &str) -> Result<VerificationRecord, VerificationStoreError> {
        let key = &self.key(login);
        let mut conn = self.conn.clone();
        let (vcode, retry): (Option<String>, Option<String>) = redis::cmd("HMGET")
            .arg(key)
            .arg(FIELD_VCODE)
            .arg(FIELD_RETRY)
            .query_async(&mut conn)
            .await
            .map_err(|e| VerificationStoreError::Backend(e.to_string()))?;

        let Some(vcode) = vcode else {
            return Err(VerificationStoreError::LoginNotFound);
        };
        let retry = parse_retry(retry.as_deref()).inspect_err(|e| {
            warn!(login = %mask_login(login), "{}", e);
        })?;

        Ok(VerificationRecord { vcode, retry })
    }

    async fn delete(&self, login: &str) -> Result<(), VerificationStoreError> {
        let key = &self.key(login);
        let mut conn = self.conn.clone();
        let removed: i64 = conn
            .del(key)
            .await
            .map_err(|e| VerificationStoreError::Backend(e.to_string()))?;
        debug!(login = %mask_login(login), removed, "verification record deleted");
        Ok(())
    }
}
