// unistat-api: Async session client for the Unifi controller station API

pub mod auth;
pub mod client;
pub mod error;
mod login;
pub mod models;
mod stations;
pub mod transport;

pub use auth::{Credentials, SessionToken};
pub use client::SessionClient;
pub use error::Error;
pub use models::Station;
pub use transport::{TlsMode, TransportConfig};
