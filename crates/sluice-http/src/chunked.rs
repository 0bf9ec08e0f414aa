//! Chunked transfer-coding body parser.
//!
//! A nested state machine driven by the request parser whenever a message
//! carries `Transfer-Encoding: chunked`. It consumes chunk-size lines,
//! chunk payloads and chunk terminators, pushing each chunk's payload
//! through [`Handler::on_body`] without copying: every emitted slice is a
//! subslice of the current feed slice.
//!
//! Chunked format:
//!
//! ```text
//! chunk-size CRLF
//! chunk-data CRLF
//! ...
//! 0 CRLF
//! CRLF
//! ```
//!
//! Lone LF is accepted wherever CRLF is expected. Trailer lines after the
//! zero chunk are not supported and are rejected.

use crate::error::ParseError;
use crate::handler::{Control, Handler};

/// State of the chunked-coding machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Accumulating hex digits of a chunk-size line.
    ChunkLength,
    /// Saw CR inside the chunk-size line; LF must follow.
    ChunkLengthCr,
    /// Consuming chunk payload octets.
    ChunkBody,
    /// Payload done; expecting the chunk terminator.
    ChunkBodyEnd,
    /// Saw CR of the chunk terminator; LF must follow.
    ChunkBodyCr,
    /// Zero-size chunk seen; expecting the final terminator.
    LastChunk,
    /// Saw CR of the final terminator; LF must follow.
    LastChunkCr,
    /// The coding is fully consumed.
    Completed,
}

/// Outcome of one [`ChunkedParser::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus<'a> {
    /// All input consumed; the body continues in a later feed.
    Partial,
    /// The final terminator was consumed. `leftover` holds the bytes after
    /// it, which belong to the next message.
    Done {
        /// Bytes following the chunked coding.
        leftover: &'a [u8],
    },
    /// A body callback asked to leave HTTP parsing.
    Upgrade,
}

/// Incremental parser for the chunked transfer coding.
///
/// Feeding while completed transparently rewinds the parser, so one
/// instance serves every chunked body on a connection.
#[derive(Debug)]
pub struct ChunkedParser {
    state: ChunkedState,
    /// Octets left in the current chunk's payload.
    chunk_len: usize,
    /// Offset into the current feed slice where the payload began.
    body_begin: usize,
    max_chunk_len: usize,
}

impl ChunkedParser {
    /// Create a parser enforcing `max_chunk_len` on every chunk.
    #[must_use]
    pub fn new(max_chunk_len: usize) -> Self {
        Self {
            state: ChunkedState::ChunkLength,
            chunk_len: 0,
            body_begin: 0,
            max_chunk_len,
        }
    }

    /// Rewind to the start of a chunk-size line.
    pub fn reset(&mut self) {
        self.state = ChunkedState::ChunkLength;
        self.chunk_len = 0;
        self.body_begin = 0;
    }

    /// Returns true once the final terminator has been consumed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == ChunkedState::Completed
    }

    /// Advance over `data`, emitting payload through `handler`.
    pub fn feed<'a, H: Handler>(
        &mut self,
        data: &'a [u8],
        handler: &mut H,
    ) -> Result<ChunkStatus<'a>, ParseError> {
        if self.state == ChunkedState::Completed {
            self.reset();
        }
        if data.is_empty() {
            return Ok(ChunkStatus::Partial);
        }
        self.body_begin = 0;

        for i in 0..data.len() {
            let byte = data[i];
            match self.state {
                ChunkedState::ChunkLength => match byte {
                    b'\r' => self.state = ChunkedState::ChunkLengthCr,
                    b'\n' => self.begin_payload(i),
                    _ => {
                        if !byte.is_ascii_hexdigit() {
                            return self.fail(ParseError::InvalidChunkSize);
                        }
                        self.chunk_len = (self.chunk_len << 4) + hex_nibble(byte);
                        if self.chunk_len > self.max_chunk_len {
                            return self.fail(ParseError::ChunkTooBig);
                        }
                    }
                },
                ChunkedState::ChunkLengthCr => {
                    if byte != b'\n' {
                        return self.fail(ParseError::InvalidChunkTerminator);
                    }
                    self.begin_payload(i);
                }
                ChunkedState::ChunkBody => {
                    self.chunk_len -= 1;
                    if self.chunk_len == 0 {
                        // one callback per chunk; the payload ends at this octet
                        match handler.on_body(&data[self.body_begin..=i]) {
                            Ok(Control::Continue) => {}
                            Ok(Control::Upgrade) => {
                                self.state = ChunkedState::Completed;
                                return Ok(ChunkStatus::Upgrade);
                            }
                            Err(err) => return self.fail(err),
                        }
                        self.state = ChunkedState::ChunkBodyEnd;
                    }
                }
                ChunkedState::ChunkBodyEnd => match byte {
                    b'\r' => self.state = ChunkedState::ChunkBodyCr,
                    b'\n' => self.state = ChunkedState::ChunkLength,
                    _ => return self.fail(ParseError::InvalidChunkTerminator),
                },
                ChunkedState::ChunkBodyCr => {
                    if byte != b'\n' {
                        return self.fail(ParseError::InvalidChunkTerminator);
                    }
                    self.state = ChunkedState::ChunkLength;
                }
                ChunkedState::LastChunk => match byte {
                    b'\r' => self.state = ChunkedState::LastChunkCr,
                    b'\n' => {
                        self.state = ChunkedState::Completed;
                        return Ok(ChunkStatus::Done {
                            leftover: &data[i + 1..],
                        });
                    }
                    // trailers are not supported
                    _ => return self.fail(ParseError::InvalidChunkTerminator),
                },
                ChunkedState::LastChunkCr => {
                    if byte != b'\n' {
                        return self.fail(ParseError::InvalidChunkTerminator);
                    }
                    self.state = ChunkedState::Completed;
                    return Ok(ChunkStatus::Done {
                        leftover: &data[i + 1..],
                    });
                }
                ChunkedState::Completed => {
                    return Ok(ChunkStatus::Done {
                        leftover: &data[i..],
                    });
                }
            }
        }

        if self.state == ChunkedState::ChunkBody && self.body_begin < data.len() {
            // the feed slice ended mid-chunk; surface the partial payload
            // now, while the slice is still alive
            match handler.on_body(&data[self.body_begin..]) {
                Ok(Control::Continue) => {}
                Ok(Control::Upgrade) => {
                    self.state = ChunkedState::Completed;
                    return Ok(ChunkStatus::Upgrade);
                }
                Err(err) => return self.fail(err),
            }
        }

        Ok(ChunkStatus::Partial)
    }

    /// Transition out of a finished chunk-size line.
    fn begin_payload(&mut self, line_end: usize) {
        if self.chunk_len == 0 {
            self.state = ChunkedState::LastChunk;
        } else {
            self.body_begin = line_end + 1;
            self.state = ChunkedState::ChunkBody;
        }
    }

    fn fail<T>(&mut self, err: ParseError) -> Result<T, ParseError> {
        self.state = ChunkedState::Completed;
        Err(err)
    }
}

/// Map an ASCII hex digit to its value. Callers must range-check first;
/// the expression folds the three digit ranges without branching.
#[inline]
fn hex_nibble(byte: u8) -> usize {
    usize::from((byte & 0x0f) + 9 * (byte >> 6))
}
