//! Error types for ringpipe operations.

use std::io;
use thiserror::Error;

/// Rejected pipeline configuration. The pipeline never starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The ring buffer must hold at least one byte.
    #[error("capacity must be greater than 0")]
    ZeroCapacity,

    /// Reads and writes must move at least one byte.
    #[error("chunk size must be greater than 0")]
    ZeroChunkSize,
}

/// The consumer abandoned the buffer; bytes put now have nowhere to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer consumer has disconnected")]
pub struct Disconnected;

/// Terminal outcome of a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The source failed while the producer was reading it.
    #[error("failed to read from source")]
    SourceRead(#[source] io::Error),

    /// The sink failed while the consumer was writing or flushing it.
    #[error("failed to write to sink")]
    SinkWrite(#[source] io::Error),

    /// A worker thread could not be started.
    #[error("failed to spawn {worker} thread")]
    Spawn {
        /// Which worker failed to start.
        worker: &'static str,
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked (e.g. a sink implementation panicked, or a
    /// buffer contract was violated).
    #[error("{worker} thread panicked")]
    WorkerPanicked {
        /// Which worker panicked.
        worker: &'static str,
    },
}

impl PipelineError {
    /// Returns `true` if the failure originated at the source.
    #[inline]
    pub fn is_source_error(&self) -> bool {
        matches!(self, Self::SourceRead(_))
    }

    /// Returns `true` if the failure originated at the sink.
    #[inline]
    pub fn is_sink_error(&self) -> bool {
        matches!(self, Self::SinkWrite(_))
    }
}
