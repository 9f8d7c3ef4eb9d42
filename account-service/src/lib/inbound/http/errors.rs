use std::error::Error as StdError;

use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;

use super::handlers::ApiErrorData;
use super::handlers::ApiResponseBody;
use crate::domain::errors::DomainError;

const INTERNAL_MESSAGE: &str = "internal server error";

/// HTTP-facing wrapper around [`DomainError`].
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(DomainError::from(err))
    }
}

/// Wire form of a domain error.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedError {
    pub status: StatusCode,
    pub body: ApiResponseBody<ApiErrorData>,
    pub retry_after: Option<u64>,
    /// Whether the full error was written to the server log.
    pub logged: bool,
}

enum Exposure {
    /// Message was authored by application code and is safe to show.
    Public,
    /// Message may carry operational detail; replaced by a generic one.
    Redacted(&'static str),
}

/// Map a domain error to its status code and response body.
///
/// Operational kinds are rendered with a generic message and only their
/// identifying fields; the complete error, including its cause chain, is
/// logged instead.
pub fn render(error: &DomainError) -> RenderedError {
    use DomainError::*;

    let mut retry_after = None;

    let (status, exposure, details) = match error {
        NotFound { .. } => (StatusCode::NOT_FOUND, Exposure::Public, None),
        InvalidInput { .. } => (StatusCode::BAD_REQUEST, Exposure::Public, None),
        Validation { field, value, .. } => (
            StatusCode::BAD_REQUEST,
            Exposure::Public,
            Some(json!({ "field": field, "value": value })),
        ),
        Duplicate { field, .. } => (
            StatusCode::CONFLICT,
            Exposure::Public,
            Some(json!({ "field": field })),
        ),
        Conflict { details, .. } => (
            StatusCode::CONFLICT,
            Exposure::Public,
            Some(json!({ "details": details })),
        ),
        Unauthorized { .. } => (StatusCode::UNAUTHORIZED, Exposure::Public, None),
        Forbidden {
            resource, action, ..
        } => (
            StatusCode::FORBIDDEN,
            Exposure::Public,
            Some(json!({ "resource": resource, "action": action })),
        ),
        PermissionDenied { operation, .. } => (
            StatusCode::FORBIDDEN,
            Exposure::Public,
            Some(json!({ "operation": operation })),
        ),
        RateLimit {
            retry_after_secs, ..
        } => {
            retry_after = Some(*retry_after_secs);
            (
                StatusCode::TOO_MANY_REQUESTS,
                Exposure::Public,
                Some(json!({ "retry_after": retry_after_secs })),
            )
        }
        TooManyRequests {
            service,
            retry_after_secs,
            ..
        } => {
            retry_after = Some(*retry_after_secs);
            (
                StatusCode::TOO_MANY_REQUESTS,
                Exposure::Public,
                Some(json!({ "service": service, "retry_after": retry_after_secs })),
            )
        }
        Timeout {
            operation, seconds, ..
        } => (
            StatusCode::REQUEST_TIMEOUT,
            Exposure::Public,
            Some(json!({ "operation": operation, "seconds": seconds })),
        ),
        PayloadTooLarge { max, actual, .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Exposure::Public,
            Some(json!({ "max": max, "actual": actual })),
        ),
        UnsupportedMediaType {
            received,
            supported,
            ..
        } => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Exposure::Public,
            Some(json!({ "received": received, "supported": supported })),
        ),
        BadGateway { upstream, .. } => (
            StatusCode::BAD_GATEWAY,
            Exposure::Redacted("upstream service error"),
            Some(json!({ "upstream": upstream })),
        ),
        ExternalApi {
            api, status_code, ..
        } => (
            StatusCode::BAD_GATEWAY,
            Exposure::Redacted("external service error"),
            Some(json!({ "api": api, "status_code": status_code })),
        ),
        ServiceUnavailable { service, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Exposure::Redacted("service temporarily unavailable"),
            Some(json!({ "service": service })),
        ),
        DatabaseConnection { database, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Exposure::Redacted("database temporarily unavailable"),
            Some(json!({ "database": database })),
        ),
        Network { host, port, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Exposure::Redacted("network error"),
            Some(json!({ "host": host, "port": port })),
        ),
        Cache { cache_type, .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Exposure::Redacted("cache temporarily unavailable"),
            Some(json!({ "cache_type": cache_type })),
        ),
        Queue {
            queue, operation, ..
        } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Exposure::Redacted("queue temporarily unavailable"),
            Some(json!({ "queue": queue, "operation": operation })),
        ),
        Migration { .. }
        | Configuration { .. }
        | FileNotFound { .. }
        | InternalServer { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Exposure::Redacted(INTERNAL_MESSAGE),
            None,
        ),
    };

    let (message, logged) = match exposure {
        Exposure::Public => (error.to_string(), false),
        Exposure::Redacted(generic) => {
            tracing::error!(
                code = error.code(),
                error = %error,
                cause = %cause_chain(error),
                "Request failed"
            );
            (generic.to_string(), true)
        }
    };

    RenderedError {
        status,
        body: ApiResponseBody::new_error(status, error.code(), message, details),
        retry_after,
        logged,
    }
}

fn cause_chain(error: &DomainError) -> String {
    let mut causes = Vec::new();
    let mut current = error.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    causes.join(": ")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let rendered = render(&self.0);
        let mut response = (rendered.status, Json(rendered.body)).into_response();

        if let Some(seconds) = rendered.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}
