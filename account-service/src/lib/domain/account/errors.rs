use thiserror::Error;

use crate::domain::errors::DomainError;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid account ID: {0}")]
    InvalidFormat(String),
}

/// Error for AccountName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountNameError {
    #[error("name is required")]
    Empty,

    #[error("name too long: maximum {max} characters")]
    TooLong { value: String, max: usize },
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Empty,

    #[error("invalid email format: {reason}")]
    InvalidFormat { value: String, reason: String },
}

/// Error for PhoneNumber validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("phone is required")]
    Empty,

    #[error("phone contains invalid characters")]
    InvalidCharacters { value: String },
}

/// Error for password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
}

impl From<AccountIdError> for DomainError {
    fn from(_: AccountIdError) -> Self {
        DomainError::invalid_input("invalid account ID")
    }
}

impl From<AccountNameError> for DomainError {
    fn from(err: AccountNameError) -> Self {
        let value = match &err {
            AccountNameError::Empty => String::new(),
            AccountNameError::TooLong { value, .. } => value.clone(),
        };
        DomainError::validation("name", value, err.to_string())
    }
}

impl From<EmailError> for DomainError {
    fn from(err: EmailError) -> Self {
        let value = match &err {
            EmailError::Empty => String::new(),
            EmailError::InvalidFormat { value, .. } => value.clone(),
        };
        DomainError::validation("email", value, err.to_string())
    }
}

impl From<PhoneNumberError> for DomainError {
    fn from(err: PhoneNumberError) -> Self {
        let value = match &err {
            PhoneNumberError::Empty => String::new(),
            PhoneNumberError::InvalidCharacters { value } => value.clone(),
        };
        DomainError::validation("phone", value, err.to_string())
    }
}

impl From<PasswordPolicyError> for DomainError {
    fn from(err: PasswordPolicyError) -> Self {
        // Never echo the plaintext
        DomainError::validation("password", "***", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_error_masks_value() {
        let err: DomainError = PasswordPolicyError::TooShort { min: 6 }.into();

        match err {
            DomainError::Validation {
                field,
                value,
                message,
            } => {
                assert_eq!(field, "password");
                assert_eq!(value, "***");
                assert_eq!(message, "password must be at least 6 characters");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_email_error_keeps_value() {
        let err: DomainError = EmailError::InvalidFormat {
            value: "not-an-email".to_string(),
            reason: "Missing separator character '@'.".to_string(),
        }
        .into();

        assert!(matches!(
            err,
            DomainError::Validation { ref field, ref value, .. }
                if field == "email" && value == "not-an-email"
        ));
    }

    #[test]
    fn test_account_id_error_is_invalid_input() {
        let err: DomainError = AccountIdError::InvalidFormat("abc".to_string()).into();

        assert_eq!(err.code(), "INVALID_INPUT");
        assert_eq!(err.to_string(), "invalid account ID");
    }
}
