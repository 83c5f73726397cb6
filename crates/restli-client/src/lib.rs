//! # Rest.li Client
//!
//! Async client for Rest.li 2.0.0 APIs, built on the protocol layer in
//! `restli-core`.
//!
//! - [`RestliClient`] runs the 14 Rest.li operations and returns typed results
//! - [`AuthClient`] covers the OAuth 2.0 token flows
//! - [`Transport`] is the seam to the network; [`ReqwestTransport`] is the
//!   default implementation and [`ErrorForStatus`] turns non-2xx responses
//!   into errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use auth::{AccessToken2L, AccessToken3L, AuthClient, RefreshTokenExchange, TokenIntrospection};
pub use client::RestliClient;
pub use config::RestliClientConfig;
pub use error::ClientError;
pub use transport::{ErrorForStatus, ReqwestTransport, Transport, TransportConfig, TransportError};
