use thiserror::Error;

/// Closed set of failures raised by the account service.
///
/// Every variant carries a human-readable `message` plus its own structured
/// context. Variants holding a `source` keep the underlying failure for
/// server-side logging; it is never part of a rendered response.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("{message}")]
    Validation {
        field: String,
        value: String,
        message: String,
    },

    #[error("{message}")]
    Duplicate { field: String, message: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    Forbidden {
        resource: String,
        action: String,
        message: String,
    },

    #[error("{message}")]
    Conflict { details: String, message: String },

    #[error("{message}")]
    RateLimit {
        retry_after_secs: u64,
        message: String,
    },

    #[error("{message}")]
    ServiceUnavailable {
        service: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    Timeout {
        operation: String,
        seconds: u64,
        message: String,
    },

    #[error("{message}")]
    PayloadTooLarge {
        max: usize,
        actual: usize,
        message: String,
    },

    #[error("{message}")]
    UnsupportedMediaType {
        received: String,
        supported: Vec<String>,
        message: String,
    },

    #[error("{message}")]
    BadGateway {
        upstream: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    TooManyRequests {
        service: String,
        retry_after_secs: u64,
        message: String,
    },

    #[error("{message}")]
    DatabaseConnection {
        database: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    Migration {
        name: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    Configuration {
        key: String,
        expected_type: String,
        message: String,
    },

    #[error("{message}")]
    FileNotFound { path: String, message: String },

    #[error("{message}")]
    PermissionDenied {
        resource: String,
        operation: String,
        message: String,
    },

    #[error("{message}")]
    Network {
        host: String,
        port: u16,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    Cache {
        cache_type: String,
        key: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    Queue {
        queue: String,
        operation: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    ExternalApi {
        api: String,
        endpoint: String,
        status_code: u16,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("{message}")]
    InternalServer {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DomainError {
    /// Stable machine-readable identifier of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::InvalidInput { .. } => "INVALID_INPUT",
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::Duplicate { .. } => "DUPLICATE",
            DomainError::Unauthorized { .. } => "UNAUTHORIZED",
            DomainError::Forbidden { .. } => "FORBIDDEN",
            DomainError::Conflict { .. } => "CONFLICT",
            DomainError::RateLimit { .. } => "RATE_LIMIT",
            DomainError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            DomainError::Timeout { .. } => "TIMEOUT",
            DomainError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            DomainError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            DomainError::BadGateway { .. } => "BAD_GATEWAY",
            DomainError::TooManyRequests { .. } => "TOO_MANY_REQUESTS",
            DomainError::DatabaseConnection { .. } => "DATABASE_CONNECTION",
            DomainError::Migration { .. } => "MIGRATION",
            DomainError::Configuration { .. } => "CONFIGURATION",
            DomainError::FileNotFound { .. } => "FILE_NOT_FOUND",
            DomainError::PermissionDenied { .. } => "PERMISSION_DENIED",
            DomainError::Network { .. } => "NETWORK",
            DomainError::Cache { .. } => "CACHE",
            DomainError::Queue { .. } => "QUEUE",
            DomainError::ExternalApi { .. } => "EXTERNAL_API",
            DomainError::InternalServer { .. } => "INTERNAL_SERVER",
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DomainError::NotFound {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        DomainError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn validation(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        DomainError::Validation {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Duplicate value for a unique field.
    pub fn duplicate(field: impl Into<String>) -> Self {
        let field = field.into();
        DomainError::Duplicate {
            message: format!("{} already exists", field),
            field,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        DomainError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(resource: impl Into<String>, action: impl Into<String>) -> Self {
        let resource = resource.into();
        let action = action.into();
        DomainError::Forbidden {
            message: format!("not allowed to {} this {}", action, resource),
            resource,
            action,
        }
    }

    pub fn conflict(details: impl Into<String>) -> Self {
        let details = details.into();
        DomainError::Conflict {
            message: format!("conflict: {}", details),
            details,
        }
    }

    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        let operation = operation.into();
        DomainError::Timeout {
            message: format!("{} timed out after {} seconds", operation, seconds),
            operation,
            seconds,
        }
    }

    pub fn payload_too_large(max: usize, actual: usize) -> Self {
        DomainError::PayloadTooLarge {
            message: format!("payload of {} bytes exceeds the limit of {} bytes", actual, max),
            max,
            actual,
        }
    }

    pub fn unsupported_media_type(received: impl Into<String>, supported: &[&str]) -> Self {
        let received = received.into();
        DomainError::UnsupportedMediaType {
            message: format!(
                "unsupported media type '{}', expected one of: {}",
                received,
                supported.join(", ")
            ),
            received,
            supported: supported.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn database_connection(
        database: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        DomainError::DatabaseConnection {
            database: database.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn migration(name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        let name = name.into();
        DomainError::Migration {
            message: format!("migration '{}' failed", name),
            name,
            source: Some(source.into()),
        }
    }

    pub fn configuration(key: impl Into<String>, expected_type: impl Into<String>) -> Self {
        let key = key.into();
        let expected_type = expected_type.into();
        DomainError::Configuration {
            message: format!("configuration key '{}' must be {}", key, expected_type),
            key,
            expected_type,
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        DomainError::FileNotFound {
            message: format!("file not found: {}", path),
            path,
        }
    }

    pub fn permission_denied(resource: impl Into<String>, operation: impl Into<String>) -> Self {
        let resource = resource.into();
        let operation = operation.into();
        DomainError::PermissionDenied {
            message: format!("permission denied to {}", operation),
            resource,
            operation,
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        DomainError::InternalServer {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        DomainError::InternalServer {
            message: "unexpected error".to_string(),
            source: Some(err),
        }
    }
}
