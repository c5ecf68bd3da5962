//! Infrastructure layer
//!
//! Adapters for the domain ports: Postgres repositories, the emission queue
//! backends, the NFS-e gateway, password hashing and tokens, plus the
//! background emission worker.

pub mod config;
pub mod metrics;
pub mod nfse;
pub mod persistence;
pub mod queue;
pub mod security;
pub mod worker;
