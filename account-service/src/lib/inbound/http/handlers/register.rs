use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::AccountData;
use super::ApiSuccess;
use crate::domain::account::models::RegisterCommand;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::extract::JsonBody;
use crate::inbound::http::router::AppState;

/// HTTP request body for registering an account (raw JSON)
///
/// Missing fields deserialize as empty strings so they are reported as
/// validation failures on the field itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    phone: String,
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(body: RegisterRequest) -> Self {
        RegisterCommand {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
        }
    }
}

pub async fn register<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<ApiSuccess<AccountData>, ApiError> {
    state
        .account_service
        .register(body.into())
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::CREATED, account.into()))
}
