use crate::domain_model::*;

#[async_trait::async_trait]
pub trait VerificationStore: Send + Sync {
    /// Store `vcode` for `login` with a lifetime of `ttl_secs`.
    /// Fails with `LoginExists` while a record for `login` is live.
    async fn create(
        &self,
        login: &str,
        vcode: &str,
        ttl_secs: u64,
    ) -> Result<(), VerificationStoreError>;

    /// Count one verification attempt. Never creates a record.
    async fn increment_retry(&self, login: &str) -> Result<(), VerificationStoreError>;

    async fn read(&self, login: &str) -> Result<VerificationRecord, VerificationStoreError>;

    /// Remove the record. Succeeds when nothing was stored.
    async fn delete(&self, login: &str) -> Result<(), VerificationStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationStoreError {
    #[error("invalid login: min 3 characters")]
    InvalidLogin,
    #[error("invalid verification code: min 3 characters")]
    InvalidCode,
    #[error("invalid ttl: min 1 second")]
    InvalidTtl,
    #[error("login exists, retry after expiration")]
    LoginExists,
    #[error("login not found or expired")]
    LoginNotFound,
    #[error("corrupt retry value: {0}")]
    Decode(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl VerificationStoreError {
    /// True for faults in the backend or its data, false for expected domain conditions.
    pub fn is_infra(&self) -> bool {
        matches!(
            self,
            VerificationStoreError::Decode(_)
                | VerificationStoreError::Backend(_)
                | VerificationStoreError::Internal(_)
        )
    }
}

pub fn validate_new_record(
    login: &str,
    vcode: &str,
    ttl_secs: u64,
) -> Result<(), VerificationStoreError> {
    if login.chars().count() < MIN_LOGIN_LEN {
        return Err(VerificationStoreError::InvalidLogin);
    }
    if vcode.chars().count() < MIN_VCODE_LEN {
        return Err(VerificationStoreError::InvalidCode);
    }
    if ttl_secs < MIN_TTL_SECS {
        return Err(VerificationStoreError::InvalidTtl);
    }
    Ok(())
}
