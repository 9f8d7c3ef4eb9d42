use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::errors::ApiError;
use crate::domain::account::models::AccountId;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::errors::DomainError;
use crate::inbound::http::router::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extension type to store the authenticated account in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
    pub email: String,
}

/// Middleware that validates access tokens and adds account info to request extensions
pub async fn authenticate<S>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    S: AccountServicePort,
{
    let token = extract_bearer_token(req.headers())?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!("JWT validation failed: {}", e);
        DomainError::unauthorized("invalid token")
    })?;

    // Refresh tokens must never authorize API calls
    if !claims.is_kind(TokenKind::Access) {
        tracing::warn!(kind = %claims.kind, "Rejected token of wrong kind");
        return Err(DomainError::unauthorized("invalid token type").into());
    }

    req.extensions_mut().insert(AuthenticatedAccount {
        account_id: AccountId(claims.sub),
        email: claims.email,
    });

    Ok(next.run(req).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, DomainError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| DomainError::unauthorized("missing authorization header"))?
        .to_str()
        .map_err(|_| DomainError::unauthorized("invalid authorization header"))?;

    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            DomainError::unauthorized(
                "invalid authorization header format, expected: Bearer <token>",
            )
        })
}
