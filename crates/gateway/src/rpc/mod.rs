//! JSON/HTTP RPC boundary between the gateway and the session manager.
//!
//! `server` is what `tradegate auth-service` runs; `client` is how the
//! gateway reaches it when `[session_service] url` is set.

pub mod client;
pub mod guard;
pub mod server;

pub use client::RemoteSessionService;
pub use server::{router, RpcState};
