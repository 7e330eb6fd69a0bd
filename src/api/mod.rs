//! Upstream API client and wire types.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiErrno;
