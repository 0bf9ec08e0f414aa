//! Incremental, push-driven HTTP/1.x request parser.
//!
//! This crate parses HTTP/1.x request streams one fragment at a time: the
//! owner feeds raw bytes as they arrive from the transport and receives
//! parsed events (method, path, protocol, each header, body pieces,
//! message boundaries) through a [`Handler`] implementation. The parser
//! performs no I/O, owns no socket, and allocates no per-message buffers
//! after construction.
//!
//! # Features
//!
//! - Push-driven operation over arbitrary fragmentation, down to one byte
//!   per feed
//! - Zero-copy events: every slice aliases the caller's input or the
//!   parser's scratch buffers
//! - Counted (`Content-Length`), chunked (`Transfer-Encoding: chunked`)
//!   and close-framed (`Connection: close`) body framing
//! - Pipelined requests parsed without caller involvement
//! - Protocol upgrade signalling with raw leftover bytes
//! - Hard, configurable limits on every buffer and body
//!
//! # Example
//!
//! ```ignore
//! use sluice_http::{Parser, ParserConfig};
//!
//! let mut parser = Parser::new(MyHandler::default(), ParserConfig::default())?;
//! while let Some(bytes) = transport.read()? {
//!     parser.feed(&bytes)?;
//! }
//! parser.feed(&[])?; // EOF
//! ```
//!
//! # What this crate is not
//!
//! The network layer, connection lifecycle, TLS, response writing and
//! routing are the owner's business. The parser does not buffer whole
//! messages, does not normalize header case, does not interpret request
//! semantics, and does not support HTTP/2 or trailer headers.

#![deny(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]

mod chunked;
mod error;
mod handler;
mod parser;
mod settings;

pub use chunked::{ChunkStatus, ChunkedParser};
pub use error::ParseError;
pub use handler::{CallbackResult, Control, Handler};
pub use parser::{FeedStatus, Parser};
pub use settings::{
    DEFAULT_INITIAL_BUFFER_CAPACITY, DEFAULT_MAX_BODY_LENGTH, DEFAULT_MAX_CHUNK_LENGTH,
    DEFAULT_MAX_HEADER_LINE_LENGTH, DEFAULT_MAX_PATH_LENGTH, ParserConfig,
};
