pub mod account;
pub mod errors;
