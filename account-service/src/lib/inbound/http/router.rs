use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::http::Request;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::MakeRequestUuid;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::request_id::SetRequestIdLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::errors::ApiError;
use super::extract::MAX_JSON_BODY_BYTES;
use super::handlers::delete_account::delete_account;
use super::handlers::get_account::get_account;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::update_account::update_account;
use super::middleware::authenticate as auth_middleware;
use crate::domain::account::ports::AccountServicePort;
use crate::domain::errors::DomainError;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct AppState<S: AccountServicePort> {
    pub account_service: Arc<S>,
    pub authenticator: Arc<Authenticator>,
}

impl<S: AccountServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            account_service: Arc::clone(&self.account_service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

pub fn create_router<S: AccountServicePort>(
    account_service: Arc<S>,
    authenticator: Arc<Authenticator>,
) -> Router {
    let state = AppState {
        account_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/health", get(health::<S>))
        .route("/api/auth/register", post(register::<S>))
        .route("/api/auth/login", post(login::<S>))
        .route("/api/auth/refresh", post(refresh::<S>));

    let protected_routes = Router::new()
        .route(
            "/api/users/:account_id",
            get(get_account::<S>)
                .put(update_account::<S>)
                .delete(delete_account::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    // Headers are left out of the span so bearer tokens never reach the log
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");

            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
                request_id = %request_id,
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError(DomainError::internal(
        "request handler panicked",
        anyhow::anyhow!(detail),
    ))
    .into_response()
}

#[cfg(test)]
mod tests {
    use auth::PasswordHasher;
    use axum::body::to_bytes;
    use axum::http::header;
    use axum::http::StatusCode;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::account::service::AccountService;
    use crate::logging::AccountLogRegistry;
    use crate::outbound::repositories::InMemoryAccountRepository;

    fn router() -> Router {
        let authenticator = Arc::new(
            Authenticator::new(
                b"test-secret-key-for-jwt-signing-at-least-32-bytes",
                chrono::Duration::hours(1),
            )
            .with_password_hasher(PasswordHasher::with_cost(8, 1, 1).expect("valid cost")),
        );
        let service = Arc::new(AccountService::new(
            Arc::new(InMemoryAccountRepository::new()),
            Arc::clone(&authenticator),
            Arc::new(AccountLogRegistry::disabled()),
        ));
        create_router(service, authenticator)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/users/1")
                    .body(Body::empty())
                    .expect("valid request"),
            )
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));

        let body = json_body(response).await;
        assert_eq!(body["status_code"], 401);
        assert_eq!(body["data"]["code"], "UNAUTHORIZED");
        assert_eq!(body["data"]["message"], "missing authorization header");
    }

    #[tokio::test]
    async fn test_register_route() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name":"A","email":"a@x.com","password":"secret1","phone":"555-0100"}"#,
                    ))
                    .expect("valid request"),
            )
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["data"]["id"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/api/unknown")
                    .body(Body::empty())
                    .expect("valid request"),
            )
            .await
            .expect("infallible");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_panic_renders_generic_error() {
        let response = handle_panic(Box::new("index out of bounds: secret detail"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["data"]["code"], "INTERNAL_SERVER");
        assert_eq!(body["data"]["message"], "internal server error");
        assert!(!body.to_string().contains("secret detail"));
    }
}
