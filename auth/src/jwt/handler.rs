use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type. Signs with HS256 and accepts nothing else:
/// a token whose header names any other algorithm is rejected.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 32 bytes for HS256)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256, zero leeway and
    /// mandatory `exp` and `nbf` claims
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Arguments
    /// * `claims` - Claims to encode (must implement Serialize)
    ///
    /// # Returns
    /// JWT token string
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `InvalidToken` - Signature, algorithm, expiry, not-before or payload check failed
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|_| JwtError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::jwt::TokenClaims;
    use crate::jwt::TokenKind;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn claims_at(offset: Duration, ttl: Duration) -> TokenClaims {
        TokenClaims::new(7, "a@x.com", TokenKind::Access, Utc::now() + offset, ttl)
    }

    #[test]
    fn test_encode_and_decode() {
        let handler = JwtHandler::new(SECRET);
        let claims = claims_at(Duration::zero(), Duration::hours(1));

        let token = handler.encode(&claims).expect("Failed to encode token");
        assert!(!token.is_empty());

        let decoded: TokenClaims = handler.decode(&token).expect("Failed to decode token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_decode_invalid_token() {
        let handler = JwtHandler::new(SECRET);

        let result = handler.decode::<TokenClaims>("invalid.token.here");
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_with_wrong_secret() {
        let handler1 = JwtHandler::new(b"secret1_at_least_32_bytes_long_key!");
        let handler2 = JwtHandler::new(b"secret2_at_least_32_bytes_long_key!");

        let token = handler1
            .encode(&claims_at(Duration::zero(), Duration::hours(1)))
            .expect("Failed to encode token");

        let result = handler2.decode::<TokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_rejects_other_algorithm() {
        let handler = JwtHandler::new(SECRET);
        let claims = claims_at(Duration::zero(), Duration::hours(1));

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        let result = handler.decode::<TokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_expired_token() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .encode(&claims_at(Duration::hours(-2), Duration::hours(1)))
            .expect("Failed to encode token");

        let result = handler.decode::<TokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_not_yet_valid_token() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .encode(&claims_at(Duration::hours(1), Duration::hours(2)))
            .expect("Failed to encode token");

        let result = handler.decode::<TokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_missing_kind() {
        let handler = JwtHandler::new(SECRET);
        let now = Utc::now().timestamp();
        let payload = serde_json::json!({
            "sub": 7,
            "email": "a@x.com",
            "iat": now,
            "nbf": now,
            "exp": now + 3600,
            "jti": "abc"
        });

        let token = handler.encode(&payload).expect("Failed to encode token");

        let result = handler.decode::<TokenClaims>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_missing_nbf() {
        let handler = JwtHandler::new(SECRET);
        let now = Utc::now().timestamp();
        let payload = serde_json::json!({
            "sub": 7,
            "email": "a@x.com",
            "kind": "access",
            "iat": now,
            "exp": now + 3600,
            "jti": "abc"
        });

        let token = handler.encode(&payload).expect("Failed to encode token");

        let result = handler.decode::<serde_json::Value>(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_decode_tampered_payload() {
        let handler = JwtHandler::new(SECRET);
        let token = handler
            .encode(&claims_at(Duration::zero(), Duration::hours(1)))
            .expect("Failed to encode token");

        let other = handler
            .encode(&TokenClaims::new(
                8,
                "b@x.com",
                TokenKind::Access,
                Utc::now(),
                Duration::hours(1),
            ))
            .expect("Failed to encode token");

        // Splice the payload of one token onto the signature of another
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        let result = handler.decode::<TokenClaims>(&forged);
        assert!(matches!(result, Err(JwtError::InvalidToken)));
    }
}
