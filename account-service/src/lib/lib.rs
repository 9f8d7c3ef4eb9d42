pub mod config;
pub mod domain;
pub mod inbound;
pub mod logging;
pub mod outbound;

pub use domain::account;
pub use domain::errors::DomainError;
pub use outbound::repositories;
