use std::fmt;
use std::str::FromStr;

use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::AccountNameError;
use crate::domain::account::errors::EmailError;
use crate::domain::account::errors::PasswordPolicyError;
use crate::domain::account::errors::PhoneNumberError;

/// Account aggregate entity.
///
/// Represents a registered account. The refresh token and its expiry are
/// held together in one optional record so they are always set or cleared
/// as a pair.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub name: AccountName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub password_hash: String,
    pub refresh_token: Option<RefreshTokenRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account unique identifier, assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Parse an account ID from string.
    ///
    /// # Arguments
    /// * `s` - Decimal account identifier
    ///
    /// # Returns
    /// Parsed AccountId
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a positive integer
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(AccountId(id)),
            _ => Err(AccountIdError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountName(String);

impl AccountName {
    const MAX_LENGTH: usize = 100;

    /// Create a new valid display name.
    ///
    /// # Errors
    /// * `Empty` - Name is empty or whitespace
    /// * `TooLong` - Name longer than 100 characters
    pub fn new(name: String) -> Result<Self, AccountNameError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AccountNameError::Empty);
        }
        if name.chars().count() > Self::MAX_LENGTH {
            return Err(AccountNameError::TooLong {
                value: name,
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `Empty` - Email is empty
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err(EmailError::Empty);
        }

        match email_address::EmailAddress::from_str(&email) {
            Ok(_) => Ok(EmailAddress(email)),
            Err(e) => Err(EmailError::InvalidFormat {
                value: email,
                reason: e.to_string(),
            }),
        }
    }

    /// Get email as string slice.
    ///
    /// # Returns
    /// Email string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Contact phone number.
///
/// Digits plus the usual separators (`+`, `-`, spaces, parentheses, dots).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(phone: String) -> Result<Self, PhoneNumberError> {
        let phone = phone.trim().to_string();
        if phone.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let valid = phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'))
            && phone.chars().any(|c| c.is_ascii_digit());

        if valid {
            Ok(Self(phone))
        } else {
            Err(PhoneNumberError::InvalidCharacters { value: phone })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password that passed the policy check.
///
/// Debug output is redacted.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;

    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.chars().count() < Self::MIN_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        Ok(Self(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Refresh token currently accepted for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Check whether the stored expiry has elapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Validated data for an account that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: AccountName,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub password_hash: String,
}

/// Command to register a new account (raw input, validated by the service).
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Command to update an existing account.
///
/// Only name and email are mutable. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountCommand {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// An account together with the token pair just issued for it.
#[derive(Debug, Clone)]
pub struct Session {
    pub account: Account,
    pub tokens: TokenPair,
}
