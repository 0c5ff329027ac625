use thiserror::Error;

/// Error type for token operations.
///
/// Verification failures are ordered: a token is checked for encoding, then
/// signature and algorithm, then expiry, then claim shape, then subject
/// format. The first failing check determines the variant. None of the
/// variants carry the token itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Signing secret is missing or empty")]
    MissingSecret,

    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed")]
    MalformedToken,

    #[error("Token signature or algorithm is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    TokenExpired,

    #[error("Token claims are malformed")]
    MalformedClaims,

    #[error("Token subject is not a valid identifier")]
    InvalidSubject,
}

impl JwtError {
    /// Short, stable name of the failure kind for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            JwtError::MissingSecret => "missing_secret",
            JwtError::EncodingFailed(_) => "encoding_failed",
            JwtError::MalformedToken => "malformed_token",
            JwtError::InvalidSignature => "invalid_signature",
            JwtError::TokenExpired => "token_expired",
            JwtError::MalformedClaims => "malformed_claims",
            JwtError::InvalidSubject => "invalid_subject",
        }
    }
}
