//! Parse error taxonomy.
//!
//! Every terminal failure of the parser is one of these variants. A
//! terminal error transitions the parser to its dead state and clears its
//! scratch buffers; subsequent calls to `feed` report [`ParseError::ParserDead`]
//! until the owner constructs a new parser.

/// HTTP parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Unknown method token, or method longer than the hard cap.
    InvalidMethod,
    /// Empty path, or a non-printable byte in the path.
    InvalidPath,
    /// A scratch buffer exceeded its configured cap.
    BufferOverflow,
    /// Protocol token outside the supported set.
    ProtocolNotSupported,
    /// CR not followed by LF.
    RequestSyntaxError,
    /// Non-printable byte in a header key or value, or a `:` where a
    /// key byte was expected.
    InvalidHeader,
    /// Non-numeric Content-Length value.
    InvalidContentLength,
    /// Non-hex byte in a chunk-size line.
    InvalidChunkSize,
    /// A single chunk's declared size exceeds the configured cap.
    ChunkTooBig,
    /// Malformed chunk terminator, or a trailer line after the zero chunk.
    InvalidChunkTerminator,
    /// A close-framed body exceeded the configured body cap.
    BodyTooLarge,
    /// `feed` was called after a terminal error.
    ParserDead,
    /// EOF was signalled on a close-framed message; the connection may be
    /// torn down. Surfaced exactly once.
    ConnectionClosed,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMethod => write!(f, "invalid HTTP method"),
            Self::InvalidPath => write!(f, "invalid request path"),
            Self::BufferOverflow => write!(f, "scratch buffer limit exceeded"),
            Self::ProtocolNotSupported => write!(f, "protocol not supported"),
            Self::RequestSyntaxError => write!(f, "request syntax error"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::InvalidContentLength => write!(f, "invalid content-length value"),
            Self::InvalidChunkSize => write!(f, "invalid chunk size"),
            Self::ChunkTooBig => write!(f, "chunk size exceeds limit"),
            Self::InvalidChunkTerminator => write!(f, "malformed chunk terminator"),
            Self::BodyTooLarge => write!(f, "body exceeds limit"),
            Self::ParserDead => write!(f, "parser is dead"),
            Self::ConnectionClosed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for ParseError {}
