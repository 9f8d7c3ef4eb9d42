use thiserror::Error;

/// Error type for JWT operations.
///
/// Every decoding failure (bad signature, foreign algorithm, expiry,
/// not-before, malformed payload) collapses into `InvalidToken`.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("invalid token")]
    InvalidToken,
}
