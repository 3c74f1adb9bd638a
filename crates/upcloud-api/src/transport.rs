// HTTP transport for the UpCloud API.
//
// The client depends on the transport only through the `Transport` trait:
// send a method, a path relative to the API root and an optional JSON body,
// get the raw response bytes back. `HttpTransport` is the reqwest-backed
// implementation; tests substitute scripted transports.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;

/// Default API root (version 1.2).
pub const DEFAULT_API_URL: &str = "https://api.upcloud.com/1.2/";

/// Anything that can perform an authenticated request against the API.
///
/// `path` is relative to the API root (`server/{uuid}/stop`). Non-2xx
/// responses must be mapped to [`Error::Api`] or [`Error::Authentication`];
/// a 2xx response yields its raw body, which may be empty.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> impl Future<Output = Result<Bytes, Error>> + Send;
}

/// Shared transport configuration for building the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Config for a custom API root (a proxy or a mock server).
    ///
    /// A trailing slash is added when missing so relative paths join
    /// underneath the root instead of replacing its last segment.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("upcloud-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ClientSetup(format!("failed to build HTTP client: {e}")))
    }
}

/// Error body returned by the API on failure.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(serde::Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// reqwest-backed [`Transport`] using HTTP basic auth.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl HttpTransport {
    pub fn new(
        username: impl Into<String>,
        password: SecretString,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            base_url: config.base_url.clone(),
            username: username.into(),
            password,
        })
    }

    /// The API account name requests are made as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn error_from_response(status: reqwest::StatusCode, body: &[u8]) -> Error {
        let (code, message) = match serde_json::from_slice::<ErrorResponse>(body) {
            Ok(resp) => (resp.error.error_code, resp.error.error_message),
            Err(_) => (None, None),
        };
        let message = message.unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body);
            let preview: String = text.chars().take(200).collect();
            format!("HTTP {status}: {preview}")
        });

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication { message };
        }
        Error::Api {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Bytes, Error> {
        let url = self.base_url.join(path)?;
        debug!("{method} {url}");

        let mut builder = self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        trace!(%status, body = %String::from_utf8_lossy(&bytes), "response");

        if !status.is_success() {
            return Err(Self::error_from_response(status, &bytes));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let config = TransportConfig::default()
            .with_base_url("http://127.0.0.1:8080/1.2")
            .unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/1.2/");
        assert_eq!(
            config.base_url.join("server/abc").unwrap().as_str(),
            "http://127.0.0.1:8080/1.2/server/abc"
        );
    }

    #[test]
    fn error_body_maps_to_api_error() {
        let body = br#"{"error":{"error_code":"SERVER_NOT_FOUND","error_message":"The server 0 does not exist."}}"#;
        let err = HttpTransport::error_from_response(reqwest::StatusCode::NOT_FOUND, body);
        assert!(err.is_not_found());
        assert_eq!(err.api_error_code(), Some("SERVER_NOT_FOUND"));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unauthorized_maps_to_authentication() {
        let body = br#"{"error":{"error_code":"AUTHENTICATION_FAILED","error_message":"Authentication failed using the given username and password."}}"#;
        let err = HttpTransport::error_from_response(reqwest::StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, Error::Authentication { .. }), "{err:?}");
    }

    #[test]
    fn non_json_error_body_is_previewed() {
        let err = HttpTransport::error_from_response(
            reqwest::StatusCode::BAD_GATEWAY,
            b"<html>bad gateway</html>",
        );
        assert!(err.is_transient());
        assert!(err.to_string().contains("bad gateway"), "{err}");
    }
}
