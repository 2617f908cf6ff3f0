//! HTTP plumbing to the vault server.
//!
//! Services only see [`BackendTransport`], so tests can swap the network for
//! an in-process server.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::types::errors::BackendError;
use crate::types::settings::BackendSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// One JSON round trip to the vault server.
pub trait BackendTransport: Send {
    /// Sends `body` as JSON to `path` and returns the decoded response.
    ///
    /// Non-2xx answers become [`BackendError::Status`] with the raw body.
    /// An empty 2xx body decodes as `Value::Null`.
    fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value, BackendError>;

    /// Drops any server session (cookies) held by the transport.
    fn reset_session(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Blocking `reqwest` client with a cookie jar for the session cookie.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        Ok(Self {
            client: Self::build_client(timeout)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn build_client(timeout: Duration) -> Result<Client, BackendError> {
        Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Client(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl BackendTransport for HttpTransport {
    fn request(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value, BackendError> {
        let url = self.url(path);
        tracing::debug!(method = method.as_str(), %url, "backend request");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Delete => self.client.delete(&url),
        }
        .header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(path, code = status.as_u16(), "backend rejected request");
            return Err(BackendError::Status {
                path: path.to_string(),
                code: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| BackendError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn reset_session(&mut self) -> Result<(), BackendError> {
        self.client = Self::build_client(self.timeout)?;
        Ok(())
    }
}

/// Decodes a JSON response into `T`, tagging errors with the endpoint.
pub fn decode<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<T, BackendError> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Serializes a request body. Payload structs always serialize.
pub fn encode<T: serde::Serialize>(path: &str, payload: &T) -> Result<Value, BackendError> {
    serde_json::to_value(payload).map_err(|e| BackendError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}
