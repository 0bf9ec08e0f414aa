//! The callback surface.
//!
//! The parser owns no request representation of its own. Instead it pushes
//! every parsed piece of a request through a [`Handler`]: the method, path
//! and protocol tokens, each header line, body pieces as they arrive, and
//! the message boundaries. Implementations decide what to keep.
//!
//! # Slice lifetimes
//!
//! Byte slices passed to a handler alias either the caller's input slice or
//! the parser's internal scratch buffers. Both may be overwritten once the
//! enclosing `feed` call returns; a handler that needs data afterwards must
//! copy it.
//!
//! # Outcomes
//!
//! Every callback returns a [`CallbackResult`]: [`Control::Continue`] to
//! keep parsing, [`Control::Upgrade`] to signal that subsequent bytes are
//! not HTTP (only meaningful from `on_message_complete`), or a
//! [`ParseError`] which aborts parsing and propagates unchanged out of
//! `feed`.

use crate::error::ParseError;

/// Flow-control outcome of a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep parsing.
    Continue,
    /// Leave HTTP parsing on this connection. Honored from
    /// `on_message_complete`; from any other callback it kills the parser.
    Upgrade,
}

/// Result of a single callback invocation.
pub type CallbackResult = Result<Control, ParseError>;

/// Receiver for parse events.
///
/// All methods default to `Ok(Control::Continue)`, so an implementation
/// only writes the callbacks it cares about.
pub trait Handler {
    /// A new message is about to be parsed. Called once at construction
    /// and once after each completed message.
    fn on_message_begin(&mut self) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// The method token, validated against the supported set.
    fn on_method(&mut self, _method: &[u8]) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// The request path, as received (no normalization or decoding).
    fn on_path(&mut self, _path: &[u8]) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// The protocol token, e.g. `HTTP/1.1`, in its original case.
    fn on_protocol(&mut self, _protocol: &[u8]) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// The request line is done; header lines follow.
    fn on_headers_begin(&mut self) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// One complete header line. `key` and `value` are adjacent regions of
    /// the parser's headers buffer; the value has any single leading space
    /// already stripped.
    fn on_header(&mut self, _key: &[u8], _value: &[u8]) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// The header block is done; body bytes (if any) follow.
    fn on_headers_complete(&mut self) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// A piece of the message body. Counted and close-framed bodies arrive
    /// in input-slice-sized pieces; chunked bodies arrive one call per
    /// chunk, or less when a chunk spans feed boundaries.
    fn on_body(&mut self, _data: &[u8]) -> CallbackResult {
        Ok(Control::Continue)
    }

    /// The message is complete. Returning [`Control::Upgrade`] here tells
    /// the caller that the connection is leaving HTTP; the parser stays
    /// alive, latched to begin a new message if fed again.
    fn on_message_complete(&mut self) -> CallbackResult {
        Ok(Control::Continue)
    }
}
