use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use super::claims::Claims;
use super::errors::JwtError;

/// Signed token handed to a client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Claim set as read back from an untrusted token.
///
/// Every field is loose so that shape problems surface as `MalformedClaims`
/// after the signature has been checked, instead of as a decoding failure.
#[derive(Debug, Deserialize)]
struct UntrustedClaims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    exp: Option<serde_json::Value>,
}

/// Issues and verifies signed, time-bound identity tokens.
///
/// The signing secret is injected once at construction and never leaves the
/// encoding/decoding keys. Only HS256 (HMAC with SHA-256) is produced or accepted.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the process signing secret.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    /// * `ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `MissingSecret` - The secret is empty
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl,
        })
    }

    /// Lifetime applied to issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a principal.
    ///
    /// # Arguments
    /// * `principal_id` - Identifier stored in the `sub` claim
    ///
    /// # Returns
    /// Signed token and its expiry instant
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, principal_id: &Uuid) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let claims = Claims::for_subject(principal_id, now, self.ttl);
        let token = self.encode(&claims)?;

        Ok(IssuedToken {
            token,
            expires_at: now + self.ttl,
        })
    }

    /// Encode arbitrary claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token and return the principal identifier it names.
    ///
    /// # Errors
    /// * `MalformedToken` - Not a decodable token
    /// * `InvalidSignature` - Wrong algorithm or signature mismatch
    /// * `TokenExpired` - `exp` is not in the future
    /// * `MalformedClaims` - `exp` or `sub` missing or of the wrong type
    /// * `InvalidSubject` - `sub` is not a UUID
    pub fn verify(&self, token: &str) -> Result<Uuid, JwtError> {
        let claims: UntrustedClaims = self.decode(token)?;

        let exp = claims
            .exp
            .as_ref()
            .and_then(serde_json::Value::as_i64)
            .ok_or(JwtError::MalformedClaims)?;
        if exp <= Utc::now().timestamp() {
            return Err(JwtError::TokenExpired);
        }

        let subject = claims
            .sub
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .ok_or(JwtError::MalformedClaims)?;

        Uuid::parse_str(subject).map_err(|_| JwtError::InvalidSubject)
    }

    /// Check encoding, algorithm and signature, then deserialize the claims.
    ///
    /// No time-based validation happens here; callers decide what the
    /// timestamps mean.
    ///
    /// # Errors
    /// * `MalformedToken` - Not a decodable token
    /// * `InvalidSignature` - Wrong algorithm or signature mismatch
    /// * `MalformedClaims` - Payload does not deserialize into `T`
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        self.check_header(token)?;

        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => JwtError::InvalidSignature,
                ErrorKind::Json(_) => JwtError::MalformedClaims,
                _ => JwtError::MalformedToken,
            })
    }

    /// Reject undecodable headers and any algorithm other than ours.
    ///
    /// Runs before the library parser so that `alg: none` and unknown
    /// algorithm names are treated as a signature failure, not a parse error.
    fn check_header(&self, token: &str) -> Result<(), JwtError> {
        let mut segments = token.split('.');
        let (Some(header), Some(_), Some(_), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(JwtError::MalformedToken);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| JwtError::MalformedToken)?;
        let header: serde_json::Value =
            serde_json::from_slice(&header_bytes).map_err(|_| JwtError::MalformedToken)?;
        let algorithm = header
            .get("alg")
            .and_then(serde_json::Value::as_str)
            .ok_or(JwtError::MalformedToken)?;

        if algorithm != "HS256" {
            return Err(JwtError::InvalidSignature);
        }

        decode_header(token)
            .map(|_| ())
            .map_err(|_| JwtError::MalformedToken)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
