use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::ensure_owner;
use super::parse_account_id;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn delete_account<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    ensure_owner(&caller, &account_id, "delete")?;

    state.account_service.delete_account(&account_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
