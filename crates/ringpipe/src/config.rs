use crate::error::ConfigError;

/// Default number of bytes per source read and per sink write.
pub const DEFAULT_CHUNK_SIZE: usize = 5;

/// Configuration for a [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Ring buffer slot count (bytes held at most in flight)
    pub capacity: usize,
    /// Read/write batch size for producer and consumer
    pub chunk_size: usize,
}

impl Config {
    /// Creates a configuration with the given capacity and the default chunk size.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the chunk size.
    pub const fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Checks that both sizes are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }
}
