use chrono::Duration;
use uuid::Uuid;

use crate::jwt::IssuedToken;
use crate::jwt::JwtError;
use crate::jwt::TokenService;
use crate::password::HashCost;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds the only copy of the signing keys; share it behind an `Arc`.
#[derive(Debug)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
    /// Digest checked when the principal does not exist
    decoy_hash: String,
}

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-principals";

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator with the default hashing cost.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_ttl` - Lifetime of issued tokens
    ///
    /// # Errors
    /// * `JwtError::MissingSecret` - Secret is empty
    /// * `PasswordError::HashingFailed` - The decoy digest could not be computed
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Result<Self, AuthenticationError> {
        Self::build(PasswordHasher::new(), jwt_secret, token_ttl)
    }

    /// Create an authenticator with an explicit hashing cost.
    ///
    /// # Errors
    /// * `JwtError::MissingSecret` - Secret is empty
    /// * `PasswordError::InvalidCost` - Cost parameters are rejected by Argon2
    pub fn with_hash_cost(
        jwt_secret: &[u8],
        token_ttl: Duration,
        cost: HashCost,
    ) -> Result<Self, AuthenticationError> {
        Self::build(PasswordHasher::with_cost(cost)?, jwt_secret, token_ttl)
    }

    fn build(
        password_hasher: PasswordHasher,
        jwt_secret: &[u8],
        token_ttl: Duration,
    ) -> Result<Self, AuthenticationError> {
        let token_service = TokenService::new(jwt_secret, token_ttl)?;
        let decoy_hash = password_hasher.hash(DECOY_PASSWORD)?;

        Ok(Self {
            password_hasher,
            token_service,
            decoy_hash,
        })
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token for the principal.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `principal_id` - Principal the token is issued for
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match (no token is issued)
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        principal_id: &Uuid,
    ) -> Result<IssuedToken, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_service.issue(principal_id)?)
    }

    /// Reject a login for a principal that does not exist.
    ///
    /// Runs one verification against a decoy digest of the same cost, so the
    /// rejection takes as long as a wrong password for a known principal.
    pub fn reject_unknown(&self, password: &str) -> AuthenticationError {
        let _ = self.password_hasher.verify(password, &self.decoy_hash);
        AuthenticationError::InvalidCredentials
    }

    /// Verify a token and return its principal identifier.
    ///
    /// # Errors
    /// * `JwtError` - The specific verification failure
    pub fn verify_token(&self, token: &str) -> Result<Uuid, JwtError> {
        self.token_service.verify(token)
    }

    /// Underlying token service.
    pub fn tokens(&self) -> &TokenService {
        &self.token_service
    }
}
