// UpCloud API client
//
// Owns a `Transport`, a `Clock` and the polling settings. Endpoint groups
// (servers, storage, etc.) are implemented as inherent methods in separate
// files under `endpoints/`; this module only covers request mechanics:
// wrapping request bodies and normalizing response envelopes.

use bytes::Bytes;
use reqwest::Method;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::envelope::{normalize, normalize_list, wrap};
use crate::error::Error;
use crate::transport::{HttpTransport, Transport, TransportConfig};
use crate::wait::{Clock, PollConfig, TokioClock};

/// Everything needed to build a [`Client`] talking to the real API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub username: String,
    pub password: SecretString,
    pub transport: TransportConfig,
    pub poll: PollConfig,
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            transport: TransportConfig::default(),
            poll: PollConfig::default(),
        }
    }
}

/// Typed client for the UpCloud API.
///
/// Holds no mutable state; independent calls (including waits) may run
/// concurrently on a shared reference.
pub struct Client<T = HttpTransport, C = TokioClock> {
    transport: T,
    clock: C,
    poll: PollConfig,
}

impl Client {
    /// Build a client over HTTP basic auth.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(config.username, config.password, &config.transport)?;
        Ok(Self {
            transport,
            clock: TokioClock,
            poll: config.poll,
        })
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over any transport, with the tokio clock and default
    /// polling.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            clock: TokioClock,
            poll: PollConfig::default(),
        }
    }
}

impl<T, C> Client<T, C> {
    /// Swap the clock used by state waits.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Client<T, C2> {
        Client {
            transport: self.transport,
            clock,
            poll: self.poll,
        }
    }

    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }
}

impl<T: Transport, C: Clock> Client<T, C> {
    // ── Request helpers ──────────────────────────────────────────────

    /// GET a single object.
    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        let raw = self.transport.send(Method::GET, path, None).await?;
        normalize(&raw)
    }

    /// GET a collection.
    pub(crate) async fn get_list<R: DeserializeOwned>(&self, path: &str) -> Result<Vec<R>, Error> {
        let raw = self.transport.send(Method::GET, path, None).await?;
        normalize_list(&raw)
    }

    /// POST `{"<key>": body}` and decode the single-object response.
    pub(crate) async fn post<B, R>(
        &self,
        path: &str,
        key: &'static str,
        body: &B,
    ) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let raw = self.send_wrapped(Method::POST, path, key, body).await?;
        normalize(&raw)
    }

    /// POST without a body and decode the single-object response.
    pub(crate) async fn post_empty<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        let raw = self.transport.send(Method::POST, path, None).await?;
        normalize(&raw)
    }

    /// POST without a body to an endpoint that answers `204 No Content`.
    pub(crate) async fn post_no_content(&self, path: &str) -> Result<(), Error> {
        self.transport.send(Method::POST, path, None).await?;
        Ok(())
    }

    /// PUT `{"<key>": body}` and decode the single-object response.
    pub(crate) async fn put<B, R>(
        &self,
        path: &str,
        key: &'static str,
        body: &B,
    ) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let raw = self.send_wrapped(Method::PUT, path, key, body).await?;
        normalize(&raw)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.transport.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send_wrapped<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        key: &'static str,
        body: &B,
    ) -> Result<Bytes, Error> {
        let encoded = serde_json::to_vec(&wrap(key, body)).map_err(Error::Serialization)?;
        self.transport.send(method, path, Some(encoded)).await
    }
}
