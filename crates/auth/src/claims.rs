use super::*;
use booking_core::ID;

/// JWT payload. `sub` is the member id in string form.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    pub sub: String,
    pub jti: uuid::Uuid,
    pub iat: u64,
    pub exp: u64,
}

impl Claims {
    pub fn new(user: ID<Member>, now: u64, ttl: std::time::Duration) -> Self {
        Self {
            sub: user.to_string(),
            jti: uuid::Uuid::now_v7(),
            iat: now,
            exp: now + ttl.as_secs(),
        }
    }
    /// A token is still fresh at the exact second it expires.
    pub fn expired(&self, now: u64) -> bool {
        now > self.exp
    }
    pub fn user(&self) -> Option<ID<Member>> {
        self.sub.parse().ok()
    }
    pub fn issued_at(&self) -> u64 {
        self.iat
    }
    pub fn expires_at(&self) -> u64 {
        self.exp
    }
}
