//! Transport seam and the HTTP adapter.
//!
//! The writer drives a transport through a fixed sequence per send: set the
//! per-request headers, stage the body, perform. Destination and constant
//! headers are installed once at writer construction and kept between sends.
//!
//! A transport performs exactly one synchronous network call per `perform`.
//! It never retries; a failed send is reported once and the batch is gone.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::TransportError;

/// Default timeout for a single HTTP send
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One synchronous network call per batch.
pub trait Transport: Send {
    /// Set the destination URI for all subsequent sends.
    fn set_destination(&mut self, uri: &str) -> Result<(), TransportError>;

    /// Install `"Name: value"` headers, replacing any existing header with
    /// the same name.
    fn set_headers(&mut self, headers: &[String]) -> Result<(), TransportError>;

    /// Stage the payload for the next send. The length travels with the
    /// buffer: encoded batches may contain embedded NUL bytes, so it is
    /// never inferred from a terminator.
    fn set_body(&mut self, body: Bytes) -> Result<(), TransportError>;

    /// Perform one synchronous send of the staged body.
    fn perform(&mut self) -> Result<(), TransportError>;

    /// Diagnostic detail for the most recent failed `perform`.
    fn error_text(&self) -> String;
}

/// Blocking HTTP POST transport.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: Option<Url>,
    headers: HeaderMap,
    body: Bytes,
    last_error: String,
}

impl HttpTransport {
    /// Create a transport with the default request timeout.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            url: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            last_error: String::new(),
        })
    }
}

impl Transport for HttpTransport {
    fn set_destination(&mut self, uri: &str) -> Result<(), TransportError> {
        let url = uri
            .parse::<Url>()
            .map_err(|e| TransportError::Destination(format!("{uri}: {e}")))?;
        self.url = Some(url);
        Ok(())
    }

    fn set_headers(&mut self, headers: &[String]) -> Result<(), TransportError> {
        for header in headers {
            let (name, value) = header
                .split_once(':')
                .ok_or_else(|| TransportError::Header(format!("missing ':' in {header:?}")))?;

            let name = HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|e| TransportError::Header(format!("{header:?}: {e}")))?;
            let value = HeaderValue::from_str(value.trim())
                .map_err(|e| TransportError::Header(format!("{header:?}: {e}")))?;

            self.headers.insert(name, value);
        }
        Ok(())
    }

    fn set_body(&mut self, body: Bytes) -> Result<(), TransportError> {
        self.body = body;
        Ok(())
    }

    fn perform(&mut self) -> Result<(), TransportError> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| TransportError::Destination("destination not set".into()))?;

        let result = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .body(self.body.to_vec())
            .send();

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.last_error = e.to_string();
                return Err(TransportError::Send(e.to_string()));
            }
        };

        let status = response.status();
        if status.is_success() {
            self.last_error.clear();
            Ok(())
        } else {
            // Keep a bounded slice of the response body for diagnostics.
            let detail = response.text().unwrap_or_default();
            let detail = detail.chars().take(256).collect::<String>();
            self.last_error = format!("HTTP {status}: {detail}");
            Err(TransportError::Status(status.as_u16()))
        }
    }

    fn error_text(&self) -> String {
        self.last_error.clone()
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;
