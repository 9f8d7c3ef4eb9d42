use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Purpose of a token, fixed at issuance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried by every account token.
///
/// All fields are required on the wire. In particular `kind` has no default,
/// so a payload without it never deserializes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject account identifier
    pub sub: i64,

    /// Subject email at issuance
    pub email: String,

    /// Token purpose
    pub kind: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

impl TokenClaims {
    /// Create claims valid from `issued_at` for `ttl`.
    ///
    /// # Arguments
    /// * `account_id` - Subject account identifier
    /// * `email` - Subject email
    /// * `kind` - Token purpose
    /// * `issued_at` - Issuance instant, also used as not-before
    /// * `ttl` - Lifetime of the token
    pub fn new(
        account_id: i64,
        email: impl Into<String>,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self::expiring_at(account_id, email, kind, issued_at, issued_at + ttl)
    }

    /// Create claims valid from `issued_at` until `expires_at`.
    pub fn expiring_at(
        account_id: i64,
        email: impl Into<String>,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let iat = issued_at.timestamp();

        Self {
            sub: account_id,
            email: email.into(),
            kind,
            iat,
            nbf: iat,
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check whether the token is of the expected kind.
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
