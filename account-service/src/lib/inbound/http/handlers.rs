use auth::TokenPair;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use super::middleware::AuthenticatedAccount;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::Session;
use crate::domain::errors::DomainError;

pub mod delete_account;
pub mod get_account;
pub mod health;
pub mod login;
pub mod refresh;
pub mod register;
pub mod update_account;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(
        status_code: StatusCode,
        code: &str,
        message: String,
        details: Option<Value>,
    ) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data: ApiErrorData {
                code: code.to_string(),
                message,
                details,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiErrorData {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Public view of an account. Never carries credentials or the phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for AccountData {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.0,
            name: account.name.as_str().to_string(),
            email: account.email.as_str().to_string(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPairData {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

impl From<&TokenPair> for TokenPairData {
    fn from(tokens: &TokenPair) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_type: "Bearer",
            access_expires_at: tokens.access_expires_at,
            refresh_expires_at: tokens.refresh_expires_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionData {
    pub account: AccountData,
    pub tokens: TokenPairData,
}

impl From<&Session> for SessionData {
    fn from(session: &Session) -> Self {
        Self {
            account: (&session.account).into(),
            tokens: (&session.tokens).into(),
        }
    }
}

/// Parse a path segment into an account id.
fn parse_account_id(raw: &str) -> Result<AccountId, DomainError> {
    Ok(AccountId::from_string(raw)?)
}

/// Callers may only act on their own account.
fn ensure_owner(
    caller: &AuthenticatedAccount,
    target: &AccountId,
    action: &str,
) -> Result<(), DomainError> {
    if caller.account_id != *target {
        tracing::warn!(
            caller = %caller.account_id,
            target = %target,
            action,
            "Rejected access to another account"
        );
        return Err(DomainError::forbidden("account", action));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(id: i64) -> AuthenticatedAccount {
        AuthenticatedAccount {
            account_id: AccountId(id),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner(&caller(1), &AccountId(1), "read").is_ok());

        match ensure_owner(&caller(1), &AccountId(2), "delete") {
            Err(DomainError::Forbidden {
                resource, action, ..
            }) => {
                assert_eq!(resource, "account");
                assert_eq!(action, "delete");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_account_id() {
        assert_eq!(parse_account_id("7").expect("valid id"), AccountId(7));

        match parse_account_id("abc") {
            Err(DomainError::InvalidInput { message }) => {
                assert_eq!(message, "invalid account ID")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_success_envelope() {
        let success = ApiSuccess::new(StatusCode::CREATED, "ok".to_string());
        let expected = ApiSuccess(
            StatusCode::CREATED,
            Json(ApiResponseBody {
                status_code: 201,
                data: "ok".to_string(),
            }),
        );
        assert_eq!(success, expected);
    }
}
