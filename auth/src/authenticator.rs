use std::sync::OnceLock;

use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::TokenClaims;
use crate::jwt::TokenManager;
use crate::jwt::TokenPair;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Plaintext hashed once to produce the decoy digest.
const DECOY_PASSWORD: &str = "decoy-password-never-matches";

/// Authentication coordinator combining password verification and token issuance.
///
/// Provides high-level authentication operations by coordinating
/// password hashing and the token manager.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_manager: TokenManager,
    decoy_hash: OnceLock<String>,
}

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
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `access_ttl` - Access token lifetime
    ///
    /// # Returns
    /// Configured Authenticator instance using default Argon2id cost
    pub fn new(jwt_secret: &[u8], access_ttl: Duration) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            token_manager: TokenManager::new(jwt_secret, access_ttl),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Replace the password hasher, e.g. with one built from configured cost.
    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self.decoy_hash = OnceLock::new();
        self
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against an optional stored hash.
    ///
    /// When no hash is available the password is still checked against a
    /// decoy digest, so an unknown account costs as much as a wrong password.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash, if the account exists
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match or no account exists
    /// * `PasswordError` - Decoy digest could not be produced
    pub fn verify_credentials(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<(), AuthenticationError> {
        match stored_hash {
            Some(hash) if self.password_hasher.verify(password, hash) => Ok(()),
            Some(_) => Err(AuthenticationError::InvalidCredentials),
            None => {
                let decoy = self.decoy_hash()?;
                // Result ignored, the outcome is a failure either way
                let _ = self.password_hasher.verify(password, decoy);
                Err(AuthenticationError::InvalidCredentials)
            }
        }
    }

    /// Issue a fresh access/refresh pair.
    ///
    /// # Errors
    /// * `JwtError` - Token generation failed
    pub fn issue_tokens(&self, account_id: i64, email: &str) -> Result<TokenPair, JwtError> {
        self.token_manager.issue_pair(account_id, email)
    }

    /// Validate and decode a token of either kind.
    ///
    /// # Errors
    /// * `JwtError` - Token validation or decoding failed
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.token_manager.validate(token)
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.token_manager
    }

    fn decoy_hash(&self) -> Result<&str, PasswordError> {
        if let Some(hash) = self.decoy_hash.get() {
            return Ok(hash.as_str());
        }

        let hash = self.password_hasher.hash(DECOY_PASSWORD)?;
        // A concurrent caller may have won the race, either value is fine
        Ok(self.decoy_hash.get_or_init(|| hash).as_str())
    }
}
