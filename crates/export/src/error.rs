//! Error types for the export path.
//!
//! Only configuration errors ever reach the caller: a writer that cannot be
//! constructed is a programming or deployment mistake and fails loudly.
//! Everything after construction (queue overflow, encode failures, network
//! failures, post-shutdown use) is absorbed and visible only through logs
//! and metrics.

use thiserror::Error;

/// Errors that abort writer construction.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Destination URL could not be set on the transport
    #[error("unable to set export destination: {0}")]
    Destination(#[source] TransportError),

    /// Standard headers could not be installed on the transport
    #[error("unable to set export headers: {0}")]
    Headers(#[source] TransportError),

    /// The background worker thread could not be spawned
    #[error("failed to spawn export worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Errors reported by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transport client could not be constructed
    #[error("transport setup failed: {0}")]
    Setup(String),

    /// Destination URI is invalid or missing
    #[error("invalid destination: {0}")]
    Destination(String),

    /// A header string could not be parsed or applied
    #[error("invalid header: {0}")]
    Header(String),

    /// The request body could not be staged
    #[error("invalid body: {0}")]
    Body(String),

    /// The send itself failed (connect, write, read)
    #[error("send failed: {0}")]
    Send(String),

    /// The collector answered with a non-success status
    #[error("server returned HTTP {0}")]
    Status(u16),
}

/// Errors from batch encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Record serialization failed
    #[error("failed to serialize batch: {0}")]
    Serialize(String),
}
