//! Upstream facade for the Angel One SmartAPI.
//!
//! Every endpoint answers with the same [`BrokerResponse`] envelope, whatever
//! went wrong on the way: transport failures, unparsable bodies and upstream
//! rejections are all folded into `status = false` with an `errorcode`.

pub mod api;
pub mod client;
pub mod normalize;
pub mod types;

pub use api::BrokerApi;
pub use client::AngelOneClient;
pub use types::*;
