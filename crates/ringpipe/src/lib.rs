//! RingPipe - Bounded Single-Producer Single-Consumer Byte Pipeline
//!
//! Moves a byte stream from a [`Read`](std::io::Read) source to a
//! [`Write`](std::io::Write) sink through a fixed-capacity ring buffer. One
//! producer thread reads the source in chunks, one consumer thread drains the
//! buffer in batches, and memory stays `O(capacity)` however long the stream is.
//!
//! # Key Features
//!
//! - Blocking backpressure (mutex + condition variables, no polling)
//! - End-of-stream folded into the buffer state: "closed and empty" is
//!   observed atomically, so completion can't be missed
//! - Deadlock-free shutdown in both directions: the producer always closes,
//!   the consumer always disconnects, even on error or panic
//! - Byte order preserved exactly: no loss, duplication or reordering
//!
//! # Example
//!
//! ```
//! # #[cfg(not(feature = "loom"))]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ringpipe::{Config, Pipeline};
//!
//! let pipeline = Pipeline::new(Config::new(4).with_chunk_size(5))?;
//!
//! let mut sink = Vec::new();
//! let report = pipeline.run(&b"HELLOWORLD"[..], &mut sink)?;
//!
//! assert_eq!(sink, b"HELLOWORLD");
//! assert!(report.buffer.peak_len <= 4);
//! # Ok(())
//! # }
//! # #[cfg(feature = "loom")]
//! # fn main() {}
//! ```
//!
//! The [`RingBuffer`] can also be driven directly:
//!
//! ```
//! # #[cfg(not(feature = "loom"))]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use ringpipe::RingBuffer;
//! use std::thread;
//!
//! let ring = RingBuffer::new(2)?;
//! let received = thread::scope(|s| {
//!     s.spawn(|| {
//!         for b in *b"abc" {
//!             ring.put(b).unwrap();
//!         }
//!         ring.close();
//!     });
//!     std::iter::from_fn(|| ring.get()).collect::<Vec<u8>>()
//! });
//! assert_eq!(received, b"abc");
//! # Ok(())
//! # }
//! # #[cfg(feature = "loom")]
//! # fn main() {}
//! ```

mod config;
mod consumer;
mod error;
mod invariants;
mod metrics;
mod pipeline;
mod producer;
mod ring;
mod sync;

pub use config::{Config, DEFAULT_CHUNK_SIZE};
pub use consumer::Consumer;
pub use error::{ConfigError, Disconnected, PipelineError};
pub use metrics::{BufferMetrics, ConsumerStats, PipelineReport, ProducerStats};
pub use pipeline::{pipe, Pipeline};
pub use producer::Producer;
pub use ring::{BufferState, RingBuffer};
