//! Parser configuration.
//!
//! [`ParserConfig`] bundles the hard limits and initial buffer capacities
//! the parser is constructed with. Limits are hard: exceeding one is a
//! terminal error, never a silent truncation.
//!
//! # Example
//!
//! ```ignore
//! use sluice_http::ParserConfig;
//!
//! let config = ParserConfig::new()
//!     .with_max_path_length(1024)
//!     .with_max_body_length(64 * 1024);
//! ```

/// Default cap on path octet count.
pub const DEFAULT_MAX_PATH_LENGTH: usize = 4092;

/// Default cap on key+value octets per header line, which is also the cap
/// on the headers scratch buffer.
pub const DEFAULT_MAX_HEADER_LINE_LENGTH: usize = 4092;

/// Default cap on body size in counted and connection-close modes.
pub const DEFAULT_MAX_BODY_LENGTH: usize = 2_147_483_647;

/// Default cap on a single chunk's size in chunked mode.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 65_535;

/// Default initial capacity of the start-line and headers buffers.
pub const DEFAULT_INITIAL_BUFFER_CAPACITY: usize = 2046;

/// Limits and buffer sizing for a [`Parser`](crate::Parser).
#[derive(Debug, Clone)]
pub struct ParserConfig {
    max_path_length: usize,
    max_header_line_length: usize,
    max_body_length: usize,
    max_chunk_length: usize,
    initial_start_line_capacity: usize,
    initial_headers_capacity: usize,
    start_line_buffer: Option<Vec<u8>>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_path_length: DEFAULT_MAX_PATH_LENGTH,
            max_header_line_length: DEFAULT_MAX_HEADER_LINE_LENGTH,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
            max_chunk_length: DEFAULT_MAX_CHUNK_LENGTH,
            initial_start_line_capacity: DEFAULT_INITIAL_BUFFER_CAPACITY,
            initial_headers_capacity: DEFAULT_INITIAL_BUFFER_CAPACITY,
            start_line_buffer: None,
        }
    }
}

impl ParserConfig {
    /// Create a configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cap on path octet count.
    #[must_use]
    pub fn with_max_path_length(mut self, len: usize) -> Self {
        self.max_path_length = len;
        self
    }

    /// Set the cap on key+value octets per header line.
    #[must_use]
    pub fn with_max_header_line_length(mut self, len: usize) -> Self {
        self.max_header_line_length = len;
        self
    }

    /// Set the cap on body size in counted and connection-close modes.
    #[must_use]
    pub fn with_max_body_length(mut self, len: usize) -> Self {
        self.max_body_length = len;
        self
    }

    /// Set the cap on a single chunk's size in chunked mode.
    #[must_use]
    pub fn with_max_chunk_length(mut self, len: usize) -> Self {
        self.max_chunk_length = len;
        self
    }

    /// Set the initial capacity of the start-line buffer.
    #[must_use]
    pub fn with_initial_start_line_capacity(mut self, capacity: usize) -> Self {
        self.initial_start_line_capacity = capacity;
        self
    }

    /// Set the initial capacity of the headers buffer.
    #[must_use]
    pub fn with_initial_headers_capacity(mut self, capacity: usize) -> Self {
        self.initial_headers_capacity = capacity;
        self
    }

    /// Supply the start-line buffer instead of letting the parser allocate
    /// one. The buffer is cleared before use; its capacity is preserved.
    #[must_use]
    pub fn with_start_line_buffer(mut self, buffer: Vec<u8>) -> Self {
        self.start_line_buffer = Some(buffer);
        self
    }

    /// Returns the cap on path octet count.
    #[must_use]
    pub fn max_path_length(&self) -> usize {
        self.max_path_length
    }

    /// Returns the cap on key+value octets per header line.
    #[must_use]
    pub fn max_header_line_length(&self) -> usize {
        self.max_header_line_length
    }

    /// Returns the cap on body size in counted and connection-close modes.
    #[must_use]
    pub fn max_body_length(&self) -> usize {
        self.max_body_length
    }

    /// Returns the cap on a single chunk's size.
    #[must_use]
    pub fn max_chunk_length(&self) -> usize {
        self.max_chunk_length
    }

    /// Returns the initial capacity of the start-line buffer.
    #[must_use]
    pub fn initial_start_line_capacity(&self) -> usize {
        self.initial_start_line_capacity
    }

    /// Returns the initial capacity of the headers buffer.
    #[must_use]
    pub fn initial_headers_capacity(&self) -> usize {
        self.initial_headers_capacity
    }

    /// Take the caller-provided start-line buffer, if any, or allocate one
    /// with the configured initial capacity.
    pub(crate) fn take_start_line_buffer(&mut self) -> Vec<u8> {
        match self.start_line_buffer.take() {
            Some(mut buffer) => {
                buffer.clear();
                buffer
            }
            None => Vec::with_capacity(self.initial_start_line_capacity),
        }
    }
}
