//! Writer configuration.
//!
//! All parameters have defaults; hosts typically only override the
//! destination. The write period bounds the maximum latency between a
//! submitted record and its attempted transmission, and must stay well
//! under the collector's retention window for queued-but-unsent data.

use std::time::Duration;

/// Default destination host
pub const DEFAULT_HOST: &str = "localhost";

/// Default destination port
pub const DEFAULT_PORT: u16 = 8040;

/// Default protocol prefix
pub const DEFAULT_PROTOCOL: &str = "http://";

/// Default collector path for record batches
pub const DEFAULT_PATH: &str = "/v1/records";

/// Max time between drain cycles. The collector discards queued records
/// older than 10s, so that is the upper bound.
pub const DEFAULT_WRITE_PERIOD: Duration = Duration::from_secs(1);

/// Default cap on records held in the pending queue
pub const DEFAULT_MAX_QUEUED_RECORDS: usize = 7000;

/// Per-request header carrying the number of records in the batch
pub const RECORD_COUNT_HEADER: &str = "X-Spanline-Record-Count";

/// Constant header identifying the client language
pub const CLIENT_LANG_HEADER: &str = "X-Spanline-Client-Language";

/// Constant header carrying the client version
pub const CLIENT_VERSION_HEADER: &str = "X-Spanline-Client-Version";

/// Configuration for a [`BatchWriter`](crate::BatchWriter).
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Destination host
    pub host: String,

    /// Destination port
    pub port: u16,

    /// Protocol prefix ("http://" or "https://")
    pub protocol: String,

    /// Path prefix for the batch endpoint
    pub path: String,

    /// Max interval between automatic drain cycles
    pub write_period: Duration,

    /// Maximum records held in the pending queue (drop-newest beyond this)
    pub max_queued_records: usize,

    /// Client version string injected into headers
    pub client_version: String,

    /// Content type of encoded batches
    pub content_type: String,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            protocol: DEFAULT_PROTOCOL.into(),
            path: DEFAULT_PATH.into(),
            write_period: DEFAULT_WRITE_PERIOD,
            max_queued_records: DEFAULT_MAX_QUEUED_RECORDS,
            client_version: env!("CARGO_PKG_VERSION").into(),
            content_type: "application/json".into(),
        }
    }
}

impl WriterConfig {
    /// Set the destination host
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the destination port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the protocol prefix
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set the endpoint path prefix
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the write period
    #[must_use]
    pub fn with_write_period(mut self, period: Duration) -> Self {
        self.write_period = period;
        self
    }

    /// Set the pending queue capacity
    #[must_use]
    pub fn with_max_queued_records(mut self, max: usize) -> Self {
        self.max_queued_records = max;
        self
    }

    /// Set the client version string
    #[must_use]
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Set the content type of encoded batches
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Full destination URL for batch sends
    pub fn endpoint_url(&self) -> String {
        format!("{}{}:{}{}", self.protocol, self.host, self.port, self.path)
    }

    /// Constant headers installed on the transport once, at construction
    pub fn standard_headers(&self) -> Vec<String> {
        vec![
            format!("Content-Type: {}", self.content_type),
            format!("{CLIENT_LANG_HEADER}: rust"),
            format!("{CLIENT_VERSION_HEADER}: {}", self.client_version),
        ]
    }
}
