//! Spanline export - the asynchronous export path of the spanline
//! telemetry client.
//!
//! Decouples record-producing call sites from delivery to a remote
//! collector. Key principles:
//!
//! - **Non-blocking**: producers never wait on the network; a full queue
//!   drops the incoming record instead of blocking (drop-newest)
//! - **Single worker**: exactly one background thread drains, encodes and
//!   transmits, so batches are never torn and never reordered
//! - **Observable completion**: `flush` returns once every record submitted
//!   before it has been handed to the transport or dropped; `shutdown`
//!   returns once the worker has exited
//! - **Host-protecting**: steady-state failures (overflow, encode errors,
//!   network errors) are absorbed and only visible via logs and metrics
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐ submit  ┌───────────────┐ drain  ┌──────────────────────┐
//! │ producers │────────▶│ pending queue │───────▶│   worker (1 thread)  │
//! └───────────┘         │   (bounded)   │        │ Encode ──▶ Transport │
//! ┌───────────┐ flush/  └───────────────┘        └──────────────────────┘
//! │   owner   │ shutdown        ▲  condvar handshake        │
//! └───────────┘─────────────────┴────────────────────────── ▼ HTTP POST
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use spanline_export::{BatchWriter, HttpTransport, JsonEncoder, WriterConfig};
//!
//! let config = WriterConfig::default()
//!     .with_host("agent.internal")
//!     .with_port(8040);
//!
//! let transport = HttpTransport::new().expect("http client");
//! let writer = BatchWriter::new(config, JsonEncoder, Box::new(transport))
//!     .expect("writer");
//!
//! // Producers: fire-and-forget, never blocks on the network.
//! writer.submit(serde_json::json!({"name": "db.query", "duration_us": 1250}));
//!
//! // Force a drain and wait for it.
//! writer.flush();
//!
//! // Deterministic teardown: joins the worker thread.
//! writer.shutdown();
//! ```
//!
//! The writer is generic over the record type and the encoder; any
//! `Fn(&[T]) -> Result<Bytes, EncodeError>` works as an encoder, and any
//! [`Transport`] implementation can replace the HTTP adapter.

mod queue;

pub mod config;
pub mod encode;
pub mod error;
pub mod metrics;
pub mod transport;
pub mod writer;

// Re-export main types at crate root for convenience
pub use config::WriterConfig;
pub use encode::{Encode, JsonEncoder};
pub use error::{EncodeError, ExportError, TransportError};
pub use metrics::MetricsSnapshot;
pub use transport::{HttpTransport, Transport};
pub use writer::BatchWriter;
