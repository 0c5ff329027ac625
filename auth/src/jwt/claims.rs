use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity claim set carried by an access token.
///
/// Only the subject and the two timestamps travel in the token; anything
/// else about the principal is resolved from storage on each request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (principal identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims with explicit timestamps.
    pub fn new(sub: impl ToString, iat: i64, exp: i64) -> Self {
        Self {
            sub: sub.to_string(),
            iat,
            exp,
        }
    }

    /// Create claims for a principal, valid from `now` for `ttl`.
    ///
    /// # Arguments
    /// * `principal_id` - Unique principal identifier
    /// * `now` - Issue instant
    /// * `ttl` - Token lifetime
    ///
    /// # Returns
    /// Claims with sub, iat and exp set
    pub fn for_subject(principal_id: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = now + ttl;
        Self::new(principal_id, now.timestamp(), expiration.timestamp())
    }
}
