use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiSuccess;
use super::SessionData;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::extract::JsonBody;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn login<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    state
        .account_service
        .login(&body.email, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}
