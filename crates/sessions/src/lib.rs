//! Session indirection for tradegate.
//!
//! Upstream broker credentials are parked server-side in a
//! [`CredentialStore`] and the browser only ever holds a signed, time-bounded
//! session token that references them.  The [`SessionManager`] ties the store
//! and the [`TokenCodec`] together and is exposed to the gateway through the
//! [`SessionService`] trait, either in-process or over the JSON RPC surface
//! described in [`protocol`].

pub mod manager;
pub mod protocol;
pub mod service;
pub mod store;
pub mod token;
pub mod verdict;

pub use manager::SessionManager;
pub use service::SessionService;
pub use store::{CredentialBundle, CredentialStore, StoredSession};
pub use token::{JwtCodec, TokenCodec, TokenError};
pub use verdict::{VerdictKind, VerificationVerdict};
