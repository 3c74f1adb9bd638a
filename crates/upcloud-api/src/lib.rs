// upcloud-api: Async Rust client for the UpCloud control-plane API

pub mod client;
mod endpoints;
pub mod envelope;
pub mod error;
pub mod models;
pub mod requests;
pub mod transport;
pub mod wait;

pub use client::{Client, ClientConfig};
pub use error::{Error, ErrorKind};
pub use transport::{HttpTransport, Transport, TransportConfig};
pub use wait::{Clock, PollConfig, StateTarget, TokioClock, TransportErrorPolicy};
