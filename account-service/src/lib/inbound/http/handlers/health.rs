use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiSuccess;
use crate::domain::account::ports::AccountServicePort;
use crate::inbound::http::errors::ApiError;
use crate::inbound::http::router::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub database: &'static str,
}

/// Report liveness together with store reachability.
///
/// A store failure surfaces as `DatabaseConnection` (503).
pub async fn health<S: AccountServicePort>(
    State(state): State<AppState<S>>,
) -> Result<ApiSuccess<HealthData>, ApiError> {
    state.account_service.check_health().await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        HealthData {
            status: "UP",
            database: "UP",
        },
    ))
}
