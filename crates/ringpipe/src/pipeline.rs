//! The orchestrator: one buffer, two worker threads, one outcome.

use crate::config::Config;
use crate::consumer::Consumer;
use crate::error::{ConfigError, PipelineError};
use crate::metrics::{ConsumerStats, PipelineReport, ProducerStats};
use crate::producer::Producer;
use crate::ring::RingBuffer;
use std::io::{Read, Write};
use std::thread::{self, ScopedJoinHandle};
use tracing::{debug, debug_span, warn, Span};

const PRODUCER_THREAD: &str = "ringpipe-producer";
const CONSUMER_THREAD: &str = "ringpipe-consumer";

/// Moves a byte stream from a source to a sink through a bounded ring buffer.
///
/// The buffer is created per [`run`](Self::run), borrowed by both workers
/// for the duration of the call, and dropped after both have joined.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Creates a pipeline after validating `config`.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs producer and consumer to completion.
    ///
    /// Returns the first fatal error. When both workers fail, the source
    /// error is returned and the sink error is logged.
    pub fn run<R, W>(&self, source: R, sink: W) -> Result<PipelineReport, PipelineError>
    where
        R: Read + Send,
        W: Write + Send,
    {
        let Config {
            capacity,
            chunk_size,
        } = self.config;
        let span = debug_span!("pipeline", capacity, chunk_size);
        let _enter = span.enter();

        let buffer = RingBuffer::new(capacity)?;
        debug!("starting producer and consumer");

        let (produced, consumed) = thread::scope(|scope| -> Result<_, PipelineError> {
            let buffer = &buffer;

            let producer = spawn_worker(scope, PRODUCER_THREAD, Span::current(), move || {
                Producer::new(buffer, chunk_size).run(source)
            })
            .map_err(|source| PipelineError::Spawn {
                worker: "producer",
                source,
            })?;

            let consumer = match spawn_worker(scope, CONSUMER_THREAD, Span::current(), move || {
                Consumer::new(buffer, chunk_size).run(sink)
            }) {
                Ok(handle) => handle,
                Err(source) => {
                    // Nobody will drain the buffer; release the producer.
                    buffer.disconnect();
                    if let Err(e) = join_worker(producer, "producer") {
                        warn!(error = %e, "producer failed while consumer spawn was aborted");
                    }
                    return Err(PipelineError::Spawn {
                        worker: "consumer",
                        source,
                    });
                }
            };

            Ok((
                join_worker(producer, "producer"),
                join_worker(consumer, "consumer"),
            ))
        })?;

        let (producer, consumer) = settle(produced, consumed)?;
        let report = PipelineReport {
            producer,
            consumer,
            buffer: buffer.metrics(),
        };

        debug!(
            bytes_read = report.bytes_read(),
            bytes_written = report.bytes_written(),
            peak_len = report.buffer.peak_len,
            "pipeline finished"
        );
        Ok(report)
    }
}

/// Runs a pipeline with `config` over `source` and `sink`.
pub fn pipe<R, W>(source: R, sink: W, config: Config) -> Result<PipelineReport, PipelineError>
where
    R: Read + Send,
    W: Write + Send,
{
    Pipeline::new(config)?.run(source, sink)
}

fn spawn_worker<'scope, 'env, T, F>(
    scope: &'scope thread::Scope<'scope, 'env>,
    name: &str,
    span: Span,
    f: F,
) -> std::io::Result<ScopedJoinHandle<'scope, T>>
where
    T: Send + 'scope,
    F: FnOnce() -> T + Send + 'scope,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn_scoped(scope, move || {
            let _enter = span.enter();
            f()
        })
}

fn join_worker<T>(
    handle: ScopedJoinHandle<'_, Result<T, PipelineError>>,
    worker: &'static str,
) -> Result<T, PipelineError> {
    handle.join().unwrap_or_else(|_| {
        warn!(worker, "worker thread panicked");
        Err(PipelineError::WorkerPanicked { worker })
    })
}

/// Reduces both worker outcomes to a single result.
fn settle(
    produced: Result<ProducerStats, PipelineError>,
    consumed: Result<ConsumerStats, PipelineError>,
) -> Result<(ProducerStats, ConsumerStats), PipelineError> {
    match (produced, consumed) {
        (Ok(p), Ok(c)) => Ok((p, c)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(source_err), Err(sink_err)) => {
            warn!(error = %sink_err, "consumer also failed");
            Err(source_err)
        }
    }
}
