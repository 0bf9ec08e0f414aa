//! Incremental HTTP/1.x request parser.
//!
//! [`Parser`] is a push-driven state machine. The owner feeds it raw byte
//! fragments as they arrive from the transport; the parser advances in
//! place and pushes events through the [`Handler`] it was constructed
//! with. It performs no I/O and allocates nothing per message: the two
//! scratch buffers are created once and reused across every request on
//! the connection.
//!
//! # Incremental operation
//!
//! `feed` accepts any fragmentation of the input, down to one byte at a
//! time, and produces the same event sequence for every fragmentation of
//! the same stream (body and header slices may differ in granularity,
//! never in content).
//!
//! # Pipelining
//!
//! When a message ends before the input slice does, the parser resets
//! itself and keeps parsing the remaining bytes as the next request, so
//! back-to-back requests in one TCP segment need no caller involvement.
//!
//! # Example
//!
//! ```ignore
//! use sluice_http::{Parser, ParserConfig};
//!
//! let mut parser = Parser::new(MyHandler::default(), ParserConfig::default())?;
//! parser.feed(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n")?;
//! ```

use crate::chunked::{ChunkStatus, ChunkedParser};
use crate::error::ParseError;
use crate::handler::{Control, Handler};
use crate::settings::ParserConfig;

/// Hard cap on the method token. The longest supported methods
/// (`OPTIONS`, `CONNECT`) are seven octets.
const MAX_METHOD_LENGTH: usize = 7;

/// Hard cap on the protocol token (`HTTP/1.1` is eight octets).
const MAX_PROTOCOL_LENGTH: usize = 10;

const SUPPORTED_METHODS: &[&[u8]] = &[
    b"GET", b"POST", b"PUT", b"DELETE", b"HEAD", b"OPTIONS", b"PATCH", b"TRACE", b"CONNECT",
];

const SUPPORTED_PROTOCOLS: &[&[u8]] = &[b"HTTP/1.1", b"HTTP/1.0", b"HTTP/0.9"];

/// State of the request machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Accumulating the method token.
    Method,
    /// Accumulating the path.
    Path,
    /// Accumulating the protocol token.
    Protocol,
    /// Saw CR after the protocol token; LF must follow.
    ProtocolCr,
    /// Request line terminated; the current byte opens the header block.
    ProtocolLf,
    /// Accumulating a header key.
    HeaderKey,
    /// Just past the `:`; an optional single leading space is dropped.
    HeaderColon,
    /// Accumulating a header value.
    HeaderValue,
    /// Saw CR after a header value; LF must follow.
    HeaderValueCr,
    /// Header line terminated; the current byte opens the next line.
    HeaderValueLf,
    /// Saw the CR of a blank line; LF completes the header block.
    HeaderValueDoubleCr,
    /// Counted or chunked body.
    Body,
    /// Close-framed body; everything until EOF is payload.
    BodyConnectionClose,
    /// Latched after an upgrade; the next feed begins a new message.
    MessageBegin,
    /// Terminal. Every feed reports [`ParseError::ParserDead`].
    Dead,
}

/// Successful outcome of a [`Parser::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus<'a> {
    /// All input was consumed; feed more bytes when they arrive.
    Advanced,
    /// A callback asked to leave HTTP parsing. `leftover` holds the raw
    /// bytes that followed the completed message; they belong to the next
    /// protocol and were not parsed.
    Upgrade {
        /// Unparsed bytes after the upgraded message.
        leftover: &'a [u8],
    },
}

/// Outcome of one parsing step over a single slice.
enum Step<'a> {
    Consumed,
    Upgrade { leftover: &'a [u8] },
    Leftover(&'a [u8]),
}

/// Classify a callback result; on error or misplaced upgrade the parser
/// dies and the enclosing step returns.
macro_rules! emit {
    ($self:ident, $result:expr) => {
        match $result {
            Ok(Control::Continue) => {}
            Ok(Control::Upgrade) => {
                $self.die();
                return Ok(Step::Upgrade { leftover: &[] });
            }
            Err(err) => {
                $self.die();
                return Err(err);
            }
        }
    };
}

/// Push-driven HTTP/1.x request parser.
///
/// Generic over its [`Handler`] so callback dispatch is static.
pub struct Parser<H> {
    handler: H,
    state: State,

    /// Start-line scratch buffer: method, path and protocol accumulate
    /// contiguously; `line_mark` is the start of the current region.
    start_line: Vec<u8>,
    line_mark: usize,

    /// Headers scratch buffer: the current line's key then value;
    /// `header_split` is the key/value boundary.
    headers: Vec<u8>,
    header_split: usize,

    /// Octets left in a counted body, or the remaining allowance of a
    /// close-framed body.
    body_bytes_left: usize,
    close_connection: bool,
    is_chunked: bool,

    chunks: ChunkedParser,

    max_path_length: usize,
    max_header_line_length: usize,
    max_body_length: usize,
}

impl<H: Handler> Parser<H> {
    /// Construct a parser over `handler` with the given limits.
    ///
    /// Invokes `on_message_begin` once; an error from that callback aborts
    /// construction.
    pub fn new(handler: H, mut config: ParserConfig) -> Result<Self, ParseError> {
        let mut parser = Self {
            handler,
            state: State::Method,
            start_line: config.take_start_line_buffer(),
            line_mark: 0,
            headers: Vec::with_capacity(config.initial_headers_capacity()),
            header_split: 0,
            body_bytes_left: 0,
            close_connection: false,
            is_chunked: false,
            chunks: ChunkedParser::new(config.max_chunk_length()),
            max_path_length: config.max_path_length(),
            max_header_line_length: config.max_header_line_length(),
            max_body_length: config.max_body_length(),
        };
        parser.handler.on_message_begin()?;
        Ok(parser)
    }

    /// Return to the initial request-line state: framing fields zeroed,
    /// buffer lengths cleared (capacity kept), chunked sub-parser rewound.
    pub fn reset(&mut self) {
        self.state = State::Method;
        self.start_line.clear();
        self.line_mark = 0;
        self.headers.clear();
        self.header_split = 0;
        self.body_bytes_left = 0;
        self.close_connection = false;
        self.is_chunked = false;
        self.chunks.reset();
    }

    /// Returns true once a terminal error has killed the parser.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.state == State::Dead
    }

    /// Borrow the handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Mutably borrow the handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Consume the parser, returning its handler.
    #[must_use]
    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Advance the machine over `data`.
    ///
    /// An empty slice signals EOF: on a close-framed message this
    /// completes it and reports [`ParseError::ConnectionClosed`];
    /// otherwise it is a no-op.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] is terminal: the parser transitions to its dead
    /// state and clears its buffers. Errors returned by callbacks
    /// propagate unchanged.
    pub fn feed<'a>(&mut self, mut data: &'a [u8]) -> Result<FeedStatus<'a>, ParseError> {
        loop {
            match self.feed_step(data)? {
                Step::Consumed => return Ok(FeedStatus::Advanced),
                Step::Upgrade { leftover } => return Ok(FeedStatus::Upgrade { leftover }),
                // a message ended mid-slice; keep parsing the tail as the
                // next pipelined request
                Step::Leftover(rest) => data = rest,
            }
        }
    }

    /// One pass over a single slice: consumes input until the slice is
    /// exhausted, a message boundary leaves a tail, or parsing stops.
    fn feed_step<'a>(&mut self, data: &'a [u8]) -> Result<Step<'a>, ParseError> {
        if self.state == State::Dead {
            return Err(ParseError::ParserDead);
        }

        if data.is_empty() {
            if self.close_connection {
                // EOF completes a close-framed message
                self.reset();
                return match self.handler.on_message_complete() {
                    Ok(Control::Continue) => {
                        // the parser is done with this connection
                        self.die();
                        Err(ParseError::ConnectionClosed)
                    }
                    Ok(Control::Upgrade) => {
                        self.state = State::MessageBegin;
                        Ok(Step::Upgrade { leftover: &[] })
                    }
                    Err(err) => {
                        self.die();
                        Err(err)
                    }
                };
            }
            return Ok(Step::Consumed);
        }

        let mut i = 0;
        while i < data.len() {
            let byte = data[i];
            match self.state {
                State::Method => {
                    if byte == b' ' {
                        if !SUPPORTED_METHODS.contains(&self.start_line.as_slice()) {
                            return self.fail(ParseError::InvalidMethod);
                        }
                        emit!(self, self.handler.on_method(&self.start_line));
                        self.line_mark = self.start_line.len();
                        self.state = State::Path;
                    } else {
                        self.start_line.push(byte);
                        if self.start_line.len() > MAX_METHOD_LENGTH {
                            return self.fail(ParseError::InvalidMethod);
                        }
                    }
                }
                State::Path => {
                    if byte == b' ' {
                        if self.start_line.len() == self.line_mark {
                            return self.fail(ParseError::InvalidPath);
                        }
                        emit!(self, self.handler.on_path(&self.start_line[self.line_mark..]));
                        self.line_mark = self.start_line.len();
                        self.state = State::Protocol;
                    } else if !is_printable(byte) {
                        return self.fail(ParseError::InvalidPath);
                    } else {
                        self.start_line.push(byte);
                        if self.start_line.len() - self.line_mark > self.max_path_length {
                            return self.fail(ParseError::BufferOverflow);
                        }
                    }
                }
                State::Protocol => match byte {
                    b'\r' => self.state = State::ProtocolCr,
                    b'\n' => self.state = State::ProtocolLf,
                    _ => {
                        self.start_line.push(byte);
                        if self.start_line.len() - self.line_mark > MAX_PROTOCOL_LENGTH {
                            return self.fail(ParseError::BufferOverflow);
                        }
                    }
                },
                State::ProtocolCr => {
                    if byte != b'\n' {
                        return self.fail(ParseError::RequestSyntaxError);
                    }
                    self.state = State::ProtocolLf;
                }
                State::ProtocolLf => {
                    // pivot into the header block: the request line is
                    // buffered and the current byte is the one after its
                    // terminator
                    if !is_protocol_supported(&self.start_line[self.line_mark..]) {
                        return self.fail(ParseError::ProtocolNotSupported);
                    }
                    emit!(
                        self,
                        self.handler.on_protocol(&self.start_line[self.line_mark..])
                    );
                    emit!(self, self.handler.on_headers_begin());

                    match byte {
                        b'\r' => self.state = State::HeaderValueDoubleCr,
                        b'\n' => {
                            // no headers at all
                            emit!(self, self.handler.on_headers_complete());
                            return self.complete_message(&data[i + 1..]);
                        }
                        b':' => return self.fail(ParseError::InvalidHeader),
                        _ if !is_printable(byte) => {
                            return self.fail(ParseError::InvalidHeader);
                        }
                        _ => {
                            self.headers.push(byte);
                            self.state = State::HeaderKey;
                        }
                    }
                }
                State::HeaderKey => {
                    if byte == b':' {
                        self.header_split = self.headers.len();
                        self.state = State::HeaderColon;
                    } else if !is_printable(byte) {
                        return self.fail(ParseError::InvalidHeader);
                    } else {
                        self.headers.push(byte);
                        if self.headers.len() > self.max_header_line_length {
                            return self.fail(ParseError::BufferOverflow);
                        }
                    }
                }
                State::HeaderColon => {
                    // drop one optional leading space; anything else is
                    // already the first value byte
                    self.state = State::HeaderValue;
                    match byte {
                        b' ' => {}
                        b'\r' => self.state = State::HeaderValueCr,
                        b'\n' => self.state = State::HeaderValueLf,
                        _ if !is_printable(byte) => {
                            return self.fail(ParseError::InvalidHeader);
                        }
                        _ => self.headers.push(byte),
                    }
                }
                State::HeaderValue => match byte {
                    b'\r' => self.state = State::HeaderValueCr,
                    b'\n' => self.state = State::HeaderValueLf,
                    _ if !is_printable(byte) => {
                        return self.fail(ParseError::InvalidHeader);
                    }
                    _ => {
                        self.headers.push(byte);
                        if self.headers.len() > self.max_header_line_length {
                            return self.fail(ParseError::BufferOverflow);
                        }
                    }
                },
                State::HeaderValueCr => {
                    if byte != b'\n' {
                        return self.fail(ParseError::RequestSyntaxError);
                    }
                    self.state = State::HeaderValueLf;
                }
                State::HeaderValueLf => {
                    // the buffered header line is complete; the current
                    // byte is the one after its terminator
                    emit!(
                        self,
                        self.handler.on_header(
                            &self.headers[..self.header_split],
                            &self.headers[self.header_split..],
                        )
                    );
                    if let Err(err) = self.interpret_header() {
                        return self.fail(err);
                    }

                    match byte {
                        b'\r' => self.state = State::HeaderValueDoubleCr,
                        b'\n' => {
                            emit!(self, self.handler.on_headers_complete());
                            match self.select_framing()? {
                                Framing::Body => {}
                                Framing::NoBody => {
                                    return self.complete_message(&data[i + 1..]);
                                }
                            }
                        }
                        _ => {
                            self.headers.clear();
                            self.headers.push(byte);
                            self.state = State::HeaderKey;
                        }
                    }
                }
                State::HeaderValueDoubleCr => {
                    if byte != b'\n' {
                        return self.fail(ParseError::RequestSyntaxError);
                    }
                    emit!(self, self.handler.on_headers_complete());
                    match self.select_framing()? {
                        Framing::Body => {}
                        Framing::NoBody => {
                            return self.complete_message(&data[i + 1..]);
                        }
                    }
                }
                State::Body => return self.dispatch_body(&data[i..]),
                State::BodyConnectionClose => {
                    let rest = &data[i..];
                    if rest.len() > self.body_bytes_left {
                        return self.fail(ParseError::BodyTooLarge);
                    }
                    self.body_bytes_left -= rest.len();
                    emit!(self, self.handler.on_body(rest));
                    return Ok(Step::Consumed);
                }
                State::MessageBegin => {
                    // latched after an upgrade; re-enter without
                    // consuming the current byte
                    emit!(self, self.handler.on_message_begin());
                    self.state = State::Method;
                    continue;
                }
                State::Dead => return Err(ParseError::ParserDead),
            }
            i += 1;
        }

        Ok(Step::Consumed)
    }

    /// Choose the body framing once the header block ends.
    fn select_framing(&mut self) -> Result<Framing, ParseError> {
        if self.close_connection {
            self.state = State::BodyConnectionClose;
            // safety ceiling; EOF defines the real length
            self.body_bytes_left = self.max_body_length;
            Ok(Framing::Body)
        } else if self.is_chunked {
            self.state = State::Body;
            Ok(Framing::Body)
        } else if self.body_bytes_left > self.max_body_length {
            self.die();
            Err(ParseError::BodyTooLarge)
        } else if self.body_bytes_left > 0 {
            self.state = State::Body;
            Ok(Framing::Body)
        } else {
            Ok(Framing::NoBody)
        }
    }

    /// Forward body bytes to the counted reader or the chunked sub-parser.
    fn dispatch_body<'a>(&mut self, data: &'a [u8]) -> Result<Step<'a>, ParseError> {
        if self.is_chunked {
            return match self.chunks.feed(data, &mut self.handler) {
                Ok(ChunkStatus::Partial) => Ok(Step::Consumed),
                Ok(ChunkStatus::Done { leftover }) => self.complete_message(leftover),
                Ok(ChunkStatus::Upgrade) => {
                    self.die();
                    Ok(Step::Upgrade { leftover: &[] })
                }
                Err(err) => {
                    self.die();
                    Err(err)
                }
            };
        }

        if self.body_bytes_left > data.len() {
            self.body_bytes_left -= data.len();
            emit!(self, self.handler.on_body(data));
            return Ok(Step::Consumed);
        }

        if self.body_bytes_left == 0 {
            // the body was already fully delivered; everything here
            // belongs to the next message
            return self.complete_message(data);
        }

        let (body, leftover) = data.split_at(self.body_bytes_left);
        self.body_bytes_left = 0;
        emit!(self, self.handler.on_body(body));
        self.complete_message(leftover)
    }

    /// Message boundary: reset, report completion, open the next message.
    fn complete_message<'a>(&mut self, leftover: &'a [u8]) -> Result<Step<'a>, ParseError> {
        self.reset();
        match self.handler.on_message_complete() {
            Ok(Control::Continue) => {}
            Ok(Control::Upgrade) => {
                self.state = State::MessageBegin;
                return Ok(Step::Upgrade { leftover });
            }
            Err(err) => {
                self.die();
                return Err(err);
            }
        }
        emit!(self, self.handler.on_message_begin());
        Ok(Step::Leftover(leftover))
    }

    /// Act on the recognized framing headers of the just-finished line.
    fn interpret_header(&mut self) -> Result<(), ParseError> {
        let (key, value) = self.headers.split_at(self.header_split);
        if key.eq_ignore_ascii_case(b"content-length") {
            self.body_bytes_left =
                parse_content_length(value).ok_or(ParseError::InvalidContentLength)?;
        } else if key.eq_ignore_ascii_case(b"transfer-encoding") {
            self.is_chunked = value.eq_ignore_ascii_case(b"chunked");
        } else if key.eq_ignore_ascii_case(b"connection") {
            self.close_connection = value.eq_ignore_ascii_case(b"close");
        }
        Ok(())
    }

    fn fail<T>(&mut self, err: ParseError) -> Result<T, ParseError> {
        self.die();
        Err(err)
    }

    fn die(&mut self) {
        self.state = State::Dead;
        self.start_line.clear();
        self.headers.clear();
    }
}

/// Body framing decision at headers-complete.
enum Framing {
    /// A body state was entered; keep consuming.
    Body,
    /// No body; the message completes immediately.
    NoBody,
}

#[inline]
fn is_printable(byte: u8) -> bool {
    (b' '..=b'~').contains(&byte)
}

fn is_protocol_supported(protocol: &[u8]) -> bool {
    SUPPORTED_PROTOCOLS
        .iter()
        .any(|candidate| protocol.eq_ignore_ascii_case(candidate))
}

/// Strict unsigned decimal parse; rejects empty, non-digit and overflowing
/// values.
fn parse_content_length(value: &[u8]) -> Option<usize> {
    if value.is_empty() {
        return None;
    }
    let mut total: usize = 0;
    for &byte in value {
        if !byte.is_ascii_digit() {
            return None;
        }
        total = total
            .checked_mul(10)?
            .checked_add(usize::from(byte - b'0'))?;
    }
    Some(total)
}
