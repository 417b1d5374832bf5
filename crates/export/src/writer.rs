//! The batching writer: bounded pending queue, one background worker, and
//! the submit/flush/shutdown coordination protocol.
//!
//! # Design
//!
//! ```text
//! producers ──submit──▶ ┌──────────────────┐        ┌────────────────────┐
//!                       │  pending queue   │──swap─▶│       worker       │
//! callers ───flush────▶ │  + control flags │        │ encode ▶ transmit  │
//! owner ────shutdown──▶ │  (one mutex)     │◀notify─│ (lock released)    │
//!                       └──────────────────┘        └────────────────────┘
//! ```
//!
//! One mutex guards the queue and the `flush_requested` / `stop_requested`
//! flags. The worker swaps the queue contents out under that lock and
//! releases it before encoding and transmitting, so a slow or hung network
//! call never propagates into producer-visible latency. Records encode in
//! FIFO acceptance order and batches transmit in formation order.
//!
//! Steady-state failures never reach the caller: a full queue drops the
//! incoming record, a failed encode or send drops the batch (no resend),
//! and post-shutdown use is a no-op. Only construction fails loudly.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};

use crate::config::{RECORD_COUNT_HEADER, WriterConfig};
use crate::encode::Encode;
use crate::error::ExportError;
use crate::metrics::{MetricsSnapshot, WriterMetrics};
use crate::queue::PendingQueue;
use crate::transport::Transport;

/// Queue and control flags, guarded by one mutex.
struct WriterState<T> {
    pending: PendingQueue<T>,
    flush_requested: bool,
    stop_requested: bool,
}

struct Shared<T> {
    state: Mutex<WriterState<T>>,
    wakeup: Condvar,
    metrics: WriterMetrics,
}

/// Asynchronous export path for telemetry records.
///
/// Owns the pending queue and exactly one background worker for its
/// lifetime. [`submit`](Self::submit) never blocks on the network;
/// [`flush`](Self::flush) blocks until an out-of-band drain cycle
/// completes; [`shutdown`](Self::shutdown) stops the worker and joins it.
/// Dropping the writer shuts it down.
pub struct BatchWriter<T> {
    shared: Arc<Shared<T>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T> BatchWriter<T> {
    /// Create a writer and start its worker.
    ///
    /// Sets the destination and constant headers on the transport before
    /// the first send; any failure there aborts construction.
    pub fn new<E>(
        config: WriterConfig,
        encoder: E,
        mut transport: Box<dyn Transport>,
    ) -> Result<Self, ExportError>
    where
        T: Send + 'static,
        E: Encode<T> + Send + 'static,
    {
        transport
            .set_destination(&config.endpoint_url())
            .map_err(ExportError::Destination)?;
        transport
            .set_headers(&config.standard_headers())
            .map_err(ExportError::Headers)?;

        let shared = Arc::new(Shared {
            state: Mutex::new(WriterState {
                pending: PendingQueue::new(config.max_queued_records),
                flush_requested: false,
                stop_requested: false,
            }),
            wakeup: Condvar::new(),
            metrics: WriterMetrics::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let write_period = config.write_period;
        let handle = thread::Builder::new()
            .name("spanline-export".into())
            .spawn(move || worker_loop(worker_shared, write_period, encoder, transport))?;

        tracing::debug!(
            destination = %config.endpoint_url(),
            write_period_ms = config.write_period.as_millis() as u64,
            max_queued_records = config.max_queued_records,
            "batch writer started"
        );

        Ok(Self {
            shared,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Enqueue a record for export.
    ///
    /// Never blocks on I/O or the worker; at most contends briefly on the
    /// queue lock. Silently discards the record if the writer has been shut
    /// down, or if the queue is at capacity (drop-newest).
    pub fn submit(&self, record: T) {
        let mut state = self.shared.state.lock();
        if state.stop_requested {
            return;
        }
        if state.pending.push(record) {
            self.shared.metrics.record_submitted();
        } else {
            self.shared.metrics.record_dropped();
            tracing::trace!("pending queue full, record dropped");
        }
    }

    /// Request an out-of-band drain cycle and wait for it to complete.
    ///
    /// Concurrent flushes coalesce onto the same cycle. Returns without
    /// further guarantee if the writer is shutting down. After this returns,
    /// every record submitted strictly before the call has been handed to
    /// the transport or dropped.
    pub fn flush(&self) {
        let mut state = self.shared.state.lock();
        if state.stop_requested {
            return;
        }
        state.flush_requested = true;
        self.shared.wakeup.notify_all();
        while state.flush_requested && !state.stop_requested {
            self.shared.wakeup.wait(&mut state);
        }
    }

    /// Stop the worker and wait for it to exit. Idempotent.
    ///
    /// Records still queued when the worker sees the stop request are
    /// dropped. An in-flight send runs to completion first; after this
    /// returns no further transmission occurs, subsequent submits are
    /// no-ops and subsequent flushes return immediately.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.stop_requested = true;
        }
        self.shared.wakeup.notify_all();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("export worker panicked during shutdown");
            }
            tracing::debug!("batch writer stopped");
        }
    }

    /// Point-in-time snapshot of the writer's counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }
}

impl<T> Drop for BatchWriter<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Worker loop. Waits up to `write_period` for a flush or stop signal, then
/// drains and transmits whatever has accumulated.
fn worker_loop<T, E>(
    shared: Arc<Shared<T>>,
    write_period: Duration,
    encoder: E,
    mut transport: Box<dyn Transport>,
) where
    E: Encode<T>,
{
    loop {
        let batch = {
            let mut state = shared.state.lock();
            let deadline = Instant::now() + write_period;
            while !state.flush_requested && !state.stop_requested {
                if shared.wakeup.wait_until(&mut state, deadline).timed_out() {
                    break;
                }
            }
            if state.stop_requested {
                // Undrained records are dropped; callers that wanted them
                // delivered should flush before shutting down.
                return;
            }
            state.pending.take_all()
        };

        if batch.is_empty() {
            // A flush cycle on an empty queue still completes.
            finish_cycle(&shared);
            continue;
        }

        match encoder.encode(&batch) {
            Ok(payload) => send_batch(transport.as_mut(), &shared.metrics, payload, batch.len()),
            Err(e) => {
                shared.metrics.record_failed();
                tracing::error!(
                    error = %e,
                    records = batch.len(),
                    "failed to encode batch, dropping"
                );
            }
        }

        finish_cycle(&shared);
    }
}

/// Clear the flush flag and wake anyone waiting on the cycle.
fn finish_cycle<T>(shared: &Shared<T>) {
    let mut state = shared.state.lock();
    state.flush_requested = false;
    drop(state);
    shared.wakeup.notify_all();
}

/// Attach the record count, stage the payload, and perform one send.
///
/// Every failure is logged and absorbed here: a failed send never crashes
/// the worker and is never retried.
fn send_batch(
    transport: &mut dyn Transport,
    metrics: &WriterMetrics,
    payload: Bytes,
    record_count: usize,
) {
    if let Err(e) = transport.set_headers(&[format!("{RECORD_COUNT_HEADER}: {record_count}")]) {
        metrics.record_failed();
        tracing::error!(error = %e, "failed to set record count header");
        return;
    }

    if let Err(e) = transport.set_body(payload) {
        metrics.record_failed();
        tracing::error!(error = %e, "failed to stage request body");
        return;
    }

    match transport.perform() {
        Ok(()) => {
            metrics.record_sent(record_count as u64);
            tracing::debug!(records = record_count, "batch delivered");
        }
        Err(e) => {
            metrics.record_failed();
            tracing::error!(
                error = %e,
                detail = %transport.error_text(),
                records = record_count,
                "failed to deliver batch, dropping"
            );
        }
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
