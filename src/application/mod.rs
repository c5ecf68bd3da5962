//! Application layer
//!
//! Use cases turn raw input into validated domain values, call the domain
//! services and shape the results into serializable responses.

pub mod auth;
pub mod company;
pub mod invoice;
