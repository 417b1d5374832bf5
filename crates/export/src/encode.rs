//! Batch encoding seam.
//!
//! The writer is generic over the record type; encoding is an injected
//! strategy. Implementations must be deterministic and pure with respect to
//! input ordering - the worker relies on the encoded payload preserving the
//! FIFO order records were accepted in.

use bytes::Bytes;
use serde::Serialize;

use crate::error::EncodeError;

/// Serializes an ordered batch of records into a single payload.
pub trait Encode<T> {
    /// Encode the batch. The slice order is submission order.
    fn encode(&self, records: &[T]) -> Result<Bytes, EncodeError>;
}

/// Any `Fn(&[T]) -> Result<Bytes, EncodeError>` is an encoder, so an encode
/// function can be injected directly.
impl<T, F> Encode<T> for F
where
    F: Fn(&[T]) -> Result<Bytes, EncodeError>,
{
    fn encode(&self, records: &[T]) -> Result<Bytes, EncodeError> {
        self(records)
    }
}

/// Encodes a batch as a JSON array of records.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl<T: Serialize> Encode<T> for JsonEncoder {
    fn encode(&self, records: &[T]) -> Result<Bytes, EncodeError> {
        serde_json::to_vec(records)
            .map(Bytes::from)
            .map_err(|e| EncodeError::Serialize(e.to_string()))
    }
}
