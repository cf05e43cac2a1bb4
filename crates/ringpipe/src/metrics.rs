//! Counters for buffer occupancy and worker progress.
//!
//! `BufferMetrics` lives inside the ring buffer's locked state, so its fields
//! are plain `u64`s updated under the same mutex as `count`.

/// Snapshot of ring buffer activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferMetrics {
    /// Bytes accepted by `put`/`put_slice`.
    pub bytes_in: u64,
    /// Bytes handed out by `get`/`try_get`.
    pub bytes_out: u64,
    /// Highest occupancy ever observed. Never exceeds capacity.
    pub peak_len: usize,
    /// Times the producer suspended on a full buffer.
    pub producer_waits: u64,
    /// Times the consumer suspended on an empty, open buffer.
    pub consumer_waits: u64,
}

impl BufferMetrics {
    #[inline]
    pub(crate) fn record_in(&mut self, n: usize, len: usize) {
        self.bytes_in += n as u64;
        self.peak_len = self.peak_len.max(len);
    }

    #[inline]
    pub(crate) fn record_out(&mut self, n: usize) {
        self.bytes_out += n as u64;
    }
}

/// Producer-side progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Successful non-empty reads from the source.
    pub reads: u64,
    /// Bytes read from the source.
    pub bytes_read: u64,
    /// The producer stopped early because the consumer went away.
    pub disconnected: bool,
}

/// Consumer-side progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Batches written to the sink. Empty batches are never written.
    pub writes: u64,
    /// Bytes written to the sink.
    pub bytes_written: u64,
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// What the producer read from the source.
    pub producer: ProducerStats,
    /// What the consumer wrote to the sink.
    pub consumer: ConsumerStats,
    /// Final ring buffer counters.
    pub buffer: BufferMetrics,
}

impl PipelineReport {
    /// Bytes read from the source.
    pub fn bytes_read(&self) -> u64 {
        self.producer.bytes_read
    }

    /// Bytes written to the sink.
    pub fn bytes_written(&self) -> u64 {
        self.consumer.bytes_written
    }
}
