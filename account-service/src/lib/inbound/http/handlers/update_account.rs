use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;

use super::ensure_owner;
use super::parse_account_id;
use super::AccountData;
use super::ApiSuccess;
use crate::domain::account::models::UpdateAccountCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::extract::JsonBody;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

/// HTTP request body for updating an account (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<UpdateAccountRequest> for UpdateAccountCommand {
    fn from(body: UpdateAccountRequest) -> Self {
        UpdateAccountCommand {
            name: body.name,
            email: body.email,
        }
    }
}

pub async fn update_account<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(account_id): Path<String>,
    JsonBody(body): JsonBody<UpdateAccountRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    ensure_owner(&caller, &account_id, "update")?;

    state
        .account_service
        .update_account(&account_id, body.into())
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}
