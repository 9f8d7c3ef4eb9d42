pub mod claims;
pub mod errors;
pub mod handler;
pub mod manager;

pub use claims::TokenClaims;
pub use claims::TokenKind;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use manager::TokenManager;
pub use manager::TokenPair;
