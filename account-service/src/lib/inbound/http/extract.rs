use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::extract::Request;
use axum::http::header;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;

use super::errors::ApiError;
use crate::domain::errors::DomainError;

/// Largest JSON request body accepted.
pub const MAX_JSON_BODY_BYTES: usize = 64 * 1024;

const JSON_MEDIA_TYPE: &str = "application/json";

/// `Json` extractor whose rejections are domain errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("none")
            .to_string();

        let declared_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<usize>().ok());

        if let Some(length) = declared_length {
            if length > MAX_JSON_BODY_BYTES {
                return Err(DomainError::payload_too_large(MAX_JSON_BODY_BYTES, length).into());
            }
        }

        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(classify_rejection(rejection, &content_type).into()),
        }
    }
}

fn classify_rejection(rejection: JsonRejection, content_type: &str) -> DomainError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            DomainError::unsupported_media_type(content_type, &[JSON_MEDIA_TYPE])
        }
        JsonRejection::JsonSyntaxError(_) => DomainError::invalid_input("malformed JSON body"),
        JsonRejection::JsonDataError(err) => DomainError::invalid_input(err.body_text()),
        // Streamed bodies have no declared length; report one byte over the limit.
        JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            DomainError::payload_too_large(MAX_JSON_BODY_BYTES, MAX_JSON_BODY_BYTES + 1)
        }
        other => DomainError::invalid_input(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[allow(dead_code)]
        email: String,
    }

    fn request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    async fn extract(req: Request) -> Result<JsonBody<Payload>, DomainError> {
        JsonBody::<Payload>::from_request(req, &())
            .await
            .map_err(|ApiError(err)| err)
    }

    #[tokio::test]
    async fn test_accepts_json() {
        let result = extract(request(Some("application/json"), r#"{"email":"a@x.com"}"#)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_content_type() {
        let result = extract(request(Some("text/plain"), r#"{"email":"a@x.com"}"#)).await;

        match result {
            Err(DomainError::UnsupportedMediaType {
                received,
                supported,
                ..
            }) => {
                assert_eq!(received, "text/plain");
                assert_eq!(supported, vec!["application/json".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let result = extract(request(None, r#"{"email":"a@x.com"}"#)).await;

        assert!(matches!(
            result,
            Err(DomainError::UnsupportedMediaType { ref received, .. }) if received == "none"
        ));
    }

    #[tokio::test]
    async fn test_declared_length_over_limit() {
        let body = "x".repeat(MAX_JSON_BODY_BYTES + 10);
        let result = extract(request(Some("application/json"), &body)).await;

        match result {
            Err(DomainError::PayloadTooLarge { max, actual, .. }) => {
                assert_eq!(max, MAX_JSON_BODY_BYTES);
                assert_eq!(actual, MAX_JSON_BODY_BYTES + 10);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_and_mistyped_bodies() {
        let syntax = extract(request(Some("application/json"), "{not json")).await;
        assert!(matches!(syntax, Err(DomainError::InvalidInput { .. })));

        let shape = extract(request(Some("application/json"), r#"{"name":"A"}"#)).await;
        match shape {
            Err(DomainError::InvalidInput { message }) => assert!(message.contains("email")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
