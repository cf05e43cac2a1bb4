use crate::error::PipelineError;
use crate::metrics::ConsumerStats;
use crate::ring::RingBuffer;
use std::io::Write;
use tracing::{debug, trace, warn};

/// Drains the ring buffer in batches into the sink.
///
/// The buffer is disconnected when [`run`](Self::run) returns, so a sink
/// failure (or panic) never leaves the producer blocked on a full buffer.
#[derive(Debug)]
pub struct Consumer<'a> {
    buffer: &'a RingBuffer,
    chunk_size: usize,
}

struct DisconnectOnDrop<'a>(&'a RingBuffer);

impl Drop for DisconnectOnDrop<'_> {
    fn drop(&mut self) {
        self.0.disconnect();
    }
}

impl<'a> Consumer<'a> {
    /// Creates a consumer writing up to `chunk_size` bytes per batch.
    ///
    /// Batches are capped at the buffer capacity.
    pub fn new(buffer: &'a RingBuffer, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0, "chunk_size must be positive");
        Self {
            buffer,
            chunk_size: chunk_size.min(buffer.capacity()),
        }
    }

    /// Copies the buffer into `sink` until the buffer is closed and empty.
    ///
    /// Each batch gathers up to `chunk_size` bytes with blocking gets and is
    /// cut short only at end-of-stream. A write or flush error aborts at once
    /// without draining the rest.
    pub fn run<W: Write>(self, mut sink: W) -> Result<ConsumerStats, PipelineError> {
        let _disconnect = DisconnectOnDrop(self.buffer);
        let mut batch = vec![0u8; self.chunk_size];
        let mut stats = ConsumerStats::default();

        loop {
            let mut filled = 0;
            let mut drained = false;
            while filled < batch.len() {
                match self.buffer.get() {
                    Some(byte) => {
                        batch[filled] = byte;
                        filled += 1;
                    }
                    None => {
                        drained = true;
                        break;
                    }
                }
            }

            if filled > 0 {
                if let Err(e) = sink.write_all(&batch[..filled]) {
                    warn!(error = %e, bytes_written = stats.bytes_written, "sink write failed");
                    return Err(PipelineError::SinkWrite(e));
                }
                stats.writes += 1;
                stats.bytes_written += filled as u64;
                trace!(bytes = filled, "consumer wrote batch");
            }

            // Closed-and-empty is terminal: the next gather would return nothing.
            if drained {
                break;
            }
        }

        if let Err(e) = sink.flush() {
            warn!(error = %e, "sink flush failed");
            return Err(PipelineError::SinkWrite(e));
        }

        debug!(
            bytes_written = stats.bytes_written,
            writes = stats.writes,
            "buffer drained"
        );
        Ok(stats)
    }
}
