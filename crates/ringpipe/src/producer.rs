use crate::error::PipelineError;
use crate::metrics::ProducerStats;
use crate::ring::RingBuffer;
use std::io::{self, Read};
use tracing::{debug, trace, warn};

/// Reads the source in chunks and feeds the ring buffer.
///
/// The buffer is closed exactly once when [`run`](Self::run) returns, on
/// every path: end-of-stream, read error, consumer disconnect, or panic.
#[derive(Debug)]
pub struct Producer<'a> {
    buffer: &'a RingBuffer,
    chunk_size: usize,
}

/// Closes the buffer when dropped so the consumer can always drain and exit.
struct CloseOnDrop<'a>(&'a RingBuffer);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

impl<'a> Producer<'a> {
    /// Creates a producer reading `chunk_size` bytes at a time.
    ///
    /// Reads never exceed the buffer capacity, so the read buffer stays
    /// `O(capacity)` whatever `chunk_size` is.
    pub fn new(buffer: &'a RingBuffer, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0, "chunk_size must be positive");
        Self {
            buffer,
            chunk_size: chunk_size.min(buffer.capacity()),
        }
    }

    /// Copies `source` into the buffer until end-of-stream.
    ///
    /// Short reads are normal. A read error stops the loop and is returned;
    /// bytes already buffered are left for the consumer to drain.
    pub fn run<R: Read>(self, mut source: R) -> Result<ProducerStats, PipelineError> {
        let _close = CloseOnDrop(self.buffer);
        let mut chunk = vec![0u8; self.chunk_size];
        let mut stats = ProducerStats::default();

        loop {
            let n = match source.read(&mut chunk) {
                Ok(0) => {
                    debug!(bytes_read = stats.bytes_read, "source reached end of stream");
                    break;
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, bytes_read = stats.bytes_read, "source read failed");
                    return Err(PipelineError::SourceRead(e));
                }
            };

            stats.reads += 1;
            stats.bytes_read += n as u64;
            trace!(bytes = n, "producer read chunk");

            if self.buffer.put_slice(&chunk[..n]).is_err() {
                debug!(bytes_read = stats.bytes_read, "consumer disconnected, producer stopping");
                stats.disconnected = true;
                break;
            }
        }

        Ok(stats)
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::ring::BufferState;

    /// Yields `data` and then fails.
    struct FailingSource<'d> {
        data: &'d [u8],
    }

    impl Read for FailingSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::other("disk on fire"));
            }
            self.data.read(buf)
        }
    }

    /// Interrupts every other read.
    struct InterruptingSource<'d> {
        data: &'d [u8],
        interrupt: bool,
    }

    impl Read for InterruptingSource<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn test_producer_reads_in_chunks_and_closes() {
        let ring = RingBuffer::new(16).unwrap();
        let stats = Producer::new(&ring, 5).run(&b"HELLOWORLD!"[..]).unwrap();

        assert_eq!(stats.reads, 3); // 5 + 5 + 1
        assert_eq!(stats.bytes_read, 11);
        assert!(!stats.disconnected);
        assert_eq!(ring.state(), BufferState::Draining);
        assert_eq!(ring.len(), 11);
    }

    #[test]
    fn test_producer_empty_source_still_closes() {
        let ring = RingBuffer::new(4).unwrap();
        let stats = Producer::new(&ring, 5).run(io::empty()).unwrap();

        assert_eq!(stats, ProducerStats::default());
        assert_eq!(ring.state(), BufferState::ClosedEmpty);
    }

    #[test]
    fn test_producer_read_error_closes() {
        let ring = RingBuffer::new(8).unwrap();
        let source = FailingSource { data: b"abc" };
        let err = Producer::new(&ring, 2).run(source).unwrap_err();

        assert!(err.is_source_error());
        assert!(ring.is_closed());
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_producer_retries_interrupted() {
        let ring = RingBuffer::new(8).unwrap();
        let source = InterruptingSource {
            data: b"retry",
            interrupt: false,
        };
        let stats = Producer::new(&ring, 8).run(source).unwrap();

        assert_eq!(stats.bytes_read, 5);
        let drained: Vec<u8> = std::iter::from_fn(|| ring.get()).collect();
        assert_eq!(drained, b"retry");
    }

    #[test]
    fn test_producer_stops_on_disconnect() {
        let ring = RingBuffer::new(4).unwrap();
        ring.disconnect();
        let stats = Producer::new(&ring, 5).run(&b"ignored"[..]).unwrap();

        assert!(stats.disconnected);
        assert_eq!(stats.reads, 1);
        assert!(ring.is_closed());
    }

    #[test]
    fn test_producer_read_size_capped_at_capacity() {
        let ring = RingBuffer::new(4).unwrap();
        let stats = Producer::new(&ring, usize::MAX).run(&b"abc"[..]).unwrap();

        assert_eq!(stats.bytes_read, 3);
        let drained: Vec<u8> = std::iter::from_fn(|| ring.get()).collect();
        assert_eq!(drained, b"abc");
    }
}
