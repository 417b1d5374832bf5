use super::*;

use crate::encode::JsonEncoder;
use crate::error::{EncodeError, TransportError};

// =============================================================================
// Mock transport
// =============================================================================

#[derive(Default)]
struct MockState {
    destination: String,
    headers: Vec<String>,
    record_count: Option<String>,
    body: Vec<u8>,
    /// Completed sends: (record count header value, body)
    sends: Vec<(Option<String>, Vec<u8>)>,
    /// Perform calls, including failed ones
    attempts: u64,
    fail_sends: bool,
    fail_setup: bool,
}

#[derive(Clone, Default)]
struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn failing() -> Self {
        let transport = Self::default();
        transport.state.lock().fail_sends = true;
        transport
    }

    fn rejecting_setup() -> Self {
        let transport = Self::default();
        transport.state.lock().fail_setup = true;
        transport
    }

    fn sends(&self) -> Vec<(Option<String>, Vec<u8>)> {
        self.state.lock().sends.clone()
    }

    fn attempts(&self) -> u64 {
        self.state.lock().attempts
    }
}

impl Transport for MockTransport {
    fn set_destination(&mut self, uri: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_setup {
            return Err(TransportError::Destination(uri.to_string()));
        }
        state.destination = uri.to_string();
        Ok(())
    }

    fn set_headers(&mut self, headers: &[String]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        for header in headers {
            if let Some(value) = header.strip_prefix("X-Spanline-Record-Count:") {
                state.record_count = Some(value.trim().to_string());
            }
            state.headers.push(header.clone());
        }
        Ok(())
    }

    fn set_body(&mut self, body: Bytes) -> Result<(), TransportError> {
        self.state.lock().body = body.to_vec();
        Ok(())
    }

    fn perform(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.attempts += 1;
        if state.fail_sends {
            return Err(TransportError::Send("mock send failure".into()));
        }
        let count = state.record_count.take();
        let body = std::mem::take(&mut state.body);
        state.sends.push((count, body));
        Ok(())
    }

    fn error_text(&self) -> String {
        "mock diagnostic detail".into()
    }
}

/// Config that never drains on the timer, so tests drive cycles via flush.
fn manual_config() -> WriterConfig {
    WriterConfig::default().with_write_period(Duration::from_secs(60))
}

fn writer_with(config: WriterConfig, transport: &MockTransport) -> BatchWriter<u32> {
    BatchWriter::new(config, JsonEncoder, Box::new(transport.clone())).unwrap()
}

fn records_in(body: &[u8]) -> Vec<u32> {
    serde_json::from_slice(body).unwrap()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_construction_configures_transport() {
    let transport = MockTransport::new();
    let _writer = writer_with(manual_config().with_client_version("1.2.3"), &transport);

    let state = transport.state.lock();
    assert_eq!(state.destination, "http://localhost:8040/v1/records");
    assert!(state
        .headers
        .contains(&"Content-Type: application/json".to_string()));
    assert!(state
        .headers
        .contains(&"X-Spanline-Client-Language: rust".to_string()));
    assert!(state
        .headers
        .contains(&"X-Spanline-Client-Version: 1.2.3".to_string()));
}

#[test]
fn test_construction_fails_on_bad_destination() {
    let transport = MockTransport::rejecting_setup();
    let result: Result<BatchWriter<u32>, _> =
        BatchWriter::new(manual_config(), JsonEncoder, Box::new(transport));
    assert!(matches!(result, Err(ExportError::Destination(_))));
}

// =============================================================================
// Ordering and flush completion
// =============================================================================

#[test]
fn test_flush_delivers_records_in_submission_order() {
    let transport = MockTransport::new();
    let writer = writer_with(manual_config(), &transport);

    writer.submit(3);
    writer.submit(1);
    writer.submit(2);
    writer.flush();

    let sends = transport.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].0.as_deref(), Some("3"));
    assert_eq!(records_in(&sends[0].1), vec![3, 1, 2]);

    let metrics = writer.metrics();
    assert_eq!(metrics.records_submitted, 3);
    assert_eq!(metrics.batches_sent, 1);
    assert_eq!(metrics.records_sent, 3);
}

#[test]
fn test_flush_on_empty_queue_completes() {
    let transport = MockTransport::new();
    let writer = writer_with(manual_config(), &transport);

    writer.flush();
    writer.flush();

    assert_eq!(transport.attempts(), 0);
}

// =============================================================================
// Bounded growth
// =============================================================================

#[test]
fn test_overflow_drops_newest_records() {
    let transport = MockTransport::new();
    let writer = writer_with(manual_config().with_max_queued_records(3), &transport);

    for i in 1..=5 {
        writer.submit(i);
    }
    writer.flush();

    let sends = transport.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(records_in(&sends[0].1), vec![1, 2, 3]);
    assert_eq!(sends[0].0.as_deref(), Some("3"));

    let metrics = writer.metrics();
    assert_eq!(metrics.records_submitted, 3);
    assert_eq!(metrics.records_dropped, 2);
}

#[test]
fn test_capacity_frees_after_drain() {
    let transport = MockTransport::new();
    let writer = writer_with(manual_config().with_max_queued_records(2), &transport);

    writer.submit(1);
    writer.submit(2);
    writer.flush();
    writer.submit(3);
    writer.flush();

    let sends = transport.sends();
    assert_eq!(sends.len(), 2);
    assert_eq!(records_in(&sends[0].1), vec![1, 2]);
    assert_eq!(records_in(&sends[1].1), vec![3]);
}

// =============================================================================
// Periodic drain
// =============================================================================

#[test]
fn test_periodic_drain_scenario() {
    // Capacity 3, write period 50ms: five back-to-back submits must produce
    // exactly one send of [1,2,3] with record count 3.
    let transport = MockTransport::new();
    let writer = writer_with(
        WriterConfig::default()
            .with_write_period(Duration::from_millis(50))
            .with_max_queued_records(3),
        &transport,
    );

    for i in 1..=5 {
        writer.submit(i);
    }
    thread::sleep(Duration::from_millis(300));

    let sends = transport.sends();
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0].0.as_deref(), Some("3"));
    assert_eq!(records_in(&sends[0].1), vec![1, 2, 3]);
    assert_eq!(writer.metrics().records_dropped, 2);

    writer.shutdown();
}

// =============================================================================
// Shutdown
// =============================================================================

#[test]
fn test_shutdown_is_final() {
    let transport = MockTransport::new();
    let writer = writer_with(
        manual_config().with_write_period(Duration::from_millis(25)),
        &transport,
    );

    writer.submit(1);
    writer.flush();
    assert_eq!(transport.attempts(), 1);

    writer.shutdown();

    writer.submit(2);
    writer.flush();
    thread::sleep(Duration::from_millis(100));

    assert_eq!(transport.attempts(), 1);
    assert_eq!(writer.metrics().records_submitted, 1);
}

#[test]
fn test_shutdown_is_idempotent() {
    let transport = MockTransport::new();
    let writer = writer_with(manual_config(), &transport);

    writer.shutdown();
    writer.shutdown();
}

#[test]
fn test_shutdown_drops_undrained_records() {
    let transport = MockTransport::new();
    let writer = writer_with(manual_config(), &transport);

    writer.submit(1);
    writer.shutdown();
    thread::sleep(Duration::from_millis(50));

    assert_eq!(transport.attempts(), 0);
}

#[test]
fn test_drop_shuts_down_the_worker() {
    let transport = MockTransport::new();
    {
        let writer = writer_with(
            manual_config().with_write_period(Duration::from_millis(25)),
            &transport,
        );
        writer.submit(1);
        writer.flush();
    }
    let attempts = transport.attempts();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(transport.attempts(), attempts);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_flushes_coalesce_without_duplication() {
    let transport = MockTransport::new();
    let writer = Arc::new(writer_with(manual_config(), &transport));

    for i in 1..=10 {
        writer.submit(i);
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let writer = Arc::clone(&writer);
        handles.push(thread::spawn(move || writer.flush()));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let delivered: Vec<u32> = transport
        .sends()
        .iter()
        .flat_map(|(_, body)| records_in(body))
        .collect();
    assert_eq!(delivered, (1..=10).collect::<Vec<u32>>());
}

#[test]
fn test_producers_submit_concurrently() {
    let transport = MockTransport::new();
    let writer = Arc::new(writer_with(manual_config(), &transport));

    let mut handles = Vec::new();
    for t in 0..4u32 {
        let writer = Arc::clone(&writer);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                writer.submit(t * 100 + i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    writer.flush();

    let mut delivered: Vec<u32> = transport
        .sends()
        .iter()
        .flat_map(|(_, body)| records_in(body))
        .collect();
    delivered.sort_unstable();
    assert_eq!(delivered, (0..400).collect::<Vec<u32>>());
}

// =============================================================================
// Failure isolation
// =============================================================================

#[test]
fn test_failing_transport_keeps_worker_alive() {
    let transport = MockTransport::failing();
    let writer = writer_with(manual_config(), &transport);

    writer.submit(1);
    writer.flush();
    assert_eq!(transport.attempts(), 1);
    assert_eq!(writer.metrics().batches_failed, 1);

    writer.submit(2);
    writer.flush();
    assert_eq!(transport.attempts(), 2);
    assert_eq!(writer.metrics().batches_failed, 2);
    assert_eq!(writer.metrics().batches_sent, 0);
}

#[test]
fn test_encode_failure_drops_batch_and_keeps_worker_alive() {
    fn refuse(_records: &[u32]) -> Result<Bytes, EncodeError> {
        Err(EncodeError::Serialize("forced".into()))
    }

    let transport = MockTransport::new();
    let writer = BatchWriter::new(manual_config(), refuse, Box::new(transport.clone())).unwrap();

    writer.submit(1);
    writer.flush();
    writer.submit(2);
    writer.flush();

    assert_eq!(transport.attempts(), 0);
    assert_eq!(writer.metrics().batches_failed, 2);
}
