//! Bounded FIFO buffer of records awaiting export.
//!
//! Insertion order is significant: the worker drains the whole queue at once
//! and the resulting batch must preserve submission order. Overflow follows
//! a drop-newest policy: a push at capacity rejects the incoming record
//! rather than displacing queued ones or blocking the producer. That bounds
//! memory and producer latency at the cost of data loss under sustained
//! overload - a deliberate tradeoff.

pub(crate) struct PendingQueue<T> {
    records: Vec<T>,
    max_capacity: usize,
}

impl<T> PendingQueue<T> {
    pub(crate) fn new(max_capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            max_capacity,
        }
    }

    /// Append a record. Returns false if the queue is at capacity and the
    /// record was dropped.
    pub(crate) fn push(&mut self, record: T) -> bool {
        if self.records.len() >= self.max_capacity {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Swap out the entire contents, leaving the queue empty. The caller
    /// owns the returned batch; ordering matches acceptance order.
    pub(crate) fn take_all(&mut self) -> Vec<T> {
        std::mem::take(&mut self.records)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}
