use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::TokenClaims;
use super::claims::TokenKind;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Refresh tokens live this many access-token lifetimes.
const REFRESH_TTL_FACTOR: i32 = 7;

/// Signed access and refresh tokens produced by one issuance.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues and validates account token pairs.
///
/// The manager checks signature, algorithm and time bounds only. Whether a
/// token is of the right kind for a given use is decided by the caller.
pub struct TokenManager {
    handler: JwtHandler,
    access_ttl: Duration,
}

impl TokenManager {
    /// Create a token manager.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret
    /// * `access_ttl` - Access token lifetime; refresh tokens live seven times longer
    pub fn new(secret: &[u8], access_ttl: Duration) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            access_ttl,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh token lifetime, `None` when seven access lifetimes overflow.
    pub fn refresh_ttl(&self) -> Option<Duration> {
        self.access_ttl.checked_mul(REFRESH_TTL_FACTOR)
    }

    /// Issue an access/refresh pair for an account.
    ///
    /// Both tokens share the same issuance instant. Either both are returned
    /// or neither.
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing failed, or an expiry is out of range
    pub fn issue_pair(&self, account_id: i64, email: &str) -> Result<TokenPair, JwtError> {
        let issued_at = Utc::now();
        let access_expires_at = expiry(issued_at, Some(self.access_ttl))?;
        let refresh_expires_at = expiry(issued_at, self.refresh_ttl())?;

        let access = TokenClaims::expiring_at(
            account_id,
            email,
            TokenKind::Access,
            issued_at,
            access_expires_at,
        );
        let refresh = TokenClaims::expiring_at(
            account_id,
            email,
            TokenKind::Refresh,
            issued_at,
            refresh_expires_at,
        );

        let access_token = self.handler.encode(&access)?;
        let refresh_token = self.handler.encode(&refresh)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_expires_at,
        })
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Any structural, cryptographic or temporal failure
    pub fn validate(&self, token: &str) -> Result<TokenClaims, JwtError> {
        self.handler.decode(token)
    }
}

fn expiry(issued_at: DateTime<Utc>, ttl: Option<Duration>) -> Result<DateTime<Utc>, JwtError> {
    ttl.and_then(|ttl| issued_at.checked_add_signed(ttl))
        .ok_or_else(|| JwtError::EncodingFailed("token lifetime out of range".to_string()))
}
