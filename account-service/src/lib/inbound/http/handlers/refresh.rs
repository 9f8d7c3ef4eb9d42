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
pub struct RefreshRequest {
    refresh_token: String,
}

/// Exchange a refresh token for a new pair. The presented token is rotated away.
pub async fn refresh<S: AccountServicePort>(
    State(state): State<AppState<S>>,
    JsonBody(body): JsonBody<RefreshRequest>,
) -> Result<ApiSuccess<SessionData>, ApiError> {
    state
        .account_service
        .refresh_session(&body.refresh_token)
        .await
        .map_err(ApiError::from)
        .map(|ref session| ApiSuccess::new(StatusCode::OK, session.into()))
}
