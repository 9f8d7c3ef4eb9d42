//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for the account service:
//! - Password hashing (Argon2id)
//! - Access/refresh token issuance and validation (HS256 JWT)
//! - Authentication coordination
//!
//! Token kind checks are left to callers. [`TokenManager::validate`] only
//! proves a token is authentic and within its time bounds.
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
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenKind, TokenManager};
//! use chrono::Duration;
//!
//! let manager = TokenManager::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let pair = manager.issue_pair(1, "a@x.com").unwrap();
//!
//! let claims = manager.validate(&pair.refresh_token).unwrap();
//! assert_eq!(claims.kind, TokenKind::Refresh);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenKind};
//! use chrono::Duration;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(1));
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue tokens
//! auth.verify_credentials("password123", Some(&hash)).unwrap();
//! let pair = auth.issue_tokens(1, "a@x.com").unwrap();
//!
//! // Validate token
//! let claims = auth.validate_token(&pair.access_token).unwrap();
//! assert_eq!(claims.kind, TokenKind::Access);
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use jwt::TokenKind;
pub use jwt::TokenManager;
pub use jwt::TokenPair;
pub use password::PasswordError;
pub use password::PasswordHasher;
