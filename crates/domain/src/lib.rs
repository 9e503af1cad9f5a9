//! Shared domain types for tradegate: the error type, structured trace
//! events, upstream credentials and the TOML configuration tree.

pub mod config;
pub mod credentials;
pub mod error;
pub mod trace;

pub use credentials::UpstreamCredentials;
