//! Authentication utilities library
//!
//! Provides the credential and identity-token infrastructure for the finance service:
//! - Password hashing (Argon2id, tunable cost)
//! - HS256 token issuance and ordered verification
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("my_passwordx", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenService;
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//! let principal = Uuid::new_v4();
//! let issued = tokens.issue(&principal).unwrap();
//! assert_eq!(tokens.verify(&issued.token).unwrap(), principal);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::Authenticator;
//! use chrono::Duration;
//! use uuid::Uuid;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24)).unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue token
//! let principal = Uuid::new_v4();
//! let issued = auth.authenticate("password123", &hash, &principal).unwrap();
//!
//! // Protected request: verify token
//! assert_eq!(auth.verify_token(&issued.token).unwrap(), principal);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::IssuedToken;
pub use jwt::JwtError;
pub use jwt::TokenService;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
