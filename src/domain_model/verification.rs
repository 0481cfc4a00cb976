use std::fmt;

pub const MIN_LOGIN_LEN: usize = 3;
pub const MIN_VCODE_LEN: usize = 3;
pub const MIN_TTL_SECS: u64 = 1;

/// Hash field holding the one-time code. A record exists iff this field exists.
pub const FIELD_VCODE: &str = "vcode";
/// Hash field holding the attempt counter.
pub const FIELD_RETRY: &str = "retry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRecord {
    pub vcode: String,
    pub retry: u64,
}

impl fmt::Display for VerificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.vcode, self.retry)
    }
}

/// Redacts a login for log output, keeping only the last four characters.
pub fn mask_login(login: &str) -> String {
    let len = login.chars().count();
    if len <= 4 {
        return "****".to_string();
    }
    let tail: String = login.chars().skip(len - 4).collect();
    format!("***{}", tail)
}
