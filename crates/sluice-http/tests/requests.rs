//! End-to-end request parsing scenarios.
//!
//! Each test drives a full parser through realistic wire input and checks
//! the complete event trace: request-line tokens, header pairs, body
//! payload and message boundaries.

use sluice_http::{
    CallbackResult, Control, FeedStatus, Handler, ParseError, Parser, ParserConfig,
};

/// One recorded callback invocation. Byte payloads are copied out, since
/// callback slices die with the enclosing `feed` call.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    MessageBegin,
    Method(Vec<u8>),
    Path(Vec<u8>),
    Protocol(Vec<u8>),
    HeadersBegin,
    Header(Vec<u8>, Vec<u8>),
    HeadersComplete,
    Body(Vec<u8>),
    MessageComplete,
}

#[derive(Debug, Default)]
struct Trace {
    events: Vec<Event>,
}

impl Trace {
    fn bodies(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Body(data) => Some(data.as_slice()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .concat()
    }

    fn count(&self, wanted: &Event) -> usize {
        self.events.iter().filter(|event| *event == wanted).count()
    }
}

impl Handler for Trace {
    fn on_message_begin(&mut self) -> CallbackResult {
        self.events.push(Event::MessageBegin);
        Ok(Control::Continue)
    }
    fn on_method(&mut self, method: &[u8]) -> CallbackResult {
        self.events.push(Event::Method(method.to_vec()));
        Ok(Control::Continue)
    }
    fn on_path(&mut self, path: &[u8]) -> CallbackResult {
        self.events.push(Event::Path(path.to_vec()));
        Ok(Control::Continue)
    }
    fn on_protocol(&mut self, protocol: &[u8]) -> CallbackResult {
        self.events.push(Event::Protocol(protocol.to_vec()));
        Ok(Control::Continue)
    }
    fn on_headers_begin(&mut self) -> CallbackResult {
        self.events.push(Event::HeadersBegin);
        Ok(Control::Continue)
    }
    fn on_header(&mut self, key: &[u8], value: &[u8]) -> CallbackResult {
        self.events.push(Event::Header(key.to_vec(), value.to_vec()));
        Ok(Control::Continue)
    }
    fn on_headers_complete(&mut self) -> CallbackResult {
        self.events.push(Event::HeadersComplete);
        Ok(Control::Continue)
    }
    fn on_body(&mut self, data: &[u8]) -> CallbackResult {
        self.events.push(Event::Body(data.to_vec()));
        Ok(Control::Continue)
    }
    fn on_message_complete(&mut self) -> CallbackResult {
        self.events.push(Event::MessageComplete);
        Ok(Control::Continue)
    }
}

fn tracing_parser() -> Parser<Trace> {
    Parser::new(Trace::default(), ParserConfig::default()).expect("construct parser")
}

/// Scenario 1: simple GET without a body.
#[test]
fn simple_get_no_body() {
    let mut parser = tracing_parser();
    parser.feed(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();

    assert_eq!(
        parser.handler().events,
        vec![
            Event::MessageBegin,
            Event::Method(b"GET".to_vec()),
            Event::Path(b"/".to_vec()),
            Event::Protocol(b"HTTP/1.1".to_vec()),
            Event::HeadersBegin,
            Event::Header(b"Host".to_vec(), b"x".to_vec()),
            Event::HeadersComplete,
            Event::MessageComplete,
            Event::MessageBegin,
        ]
    );
}

/// Scenario 2: the same request fed one byte at a time yields the same
/// trace.
#[test]
fn simple_get_byte_by_byte() {
    let input: &[u8] = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";

    let mut whole = tracing_parser();
    whole.feed(input).unwrap();

    let mut fragmented = tracing_parser();
    for i in 0..input.len() {
        fragmented.feed(&input[i..=i]).unwrap();
    }

    assert_eq!(whole.handler().events, fragmented.handler().events);
}

/// Scenario 3: Content-Length framed body.
#[test]
fn content_length_body() {
    let mut parser = tracing_parser();
    parser
        .feed(b"POST /a HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello")
        .unwrap();

    let trace = parser.handler();
    assert_eq!(trace.bodies(), b"hello");
    assert_eq!(trace.count(&Event::MessageComplete), 1);
    assert_eq!(
        trace.events[1..4],
        [
            Event::Method(b"POST".to_vec()),
            Event::Path(b"/a".to_vec()),
            Event::Protocol(b"HTTP/1.0".to_vec()),
        ]
    );
}

/// Scenario 4: chunked body reassembles across chunks.
#[test]
fn chunked_body() {
    let mut parser = tracing_parser();
    parser
        .feed(
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n\
              5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n",
        )
        .unwrap();

    let trace = parser.handler();
    assert_eq!(trace.bodies(), b"hello world");
    assert_eq!(trace.count(&Event::MessageComplete), 1);
}

/// Scenario 5: two pipelined requests produce two full traces.
#[test]
fn pipelined_requests() {
    let single: &[u8] = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
    let doubled = [single, single].concat();

    let mut parser = tracing_parser();
    parser.feed(&doubled).unwrap();

    let trace = parser.handler();
    assert_eq!(trace.count(&Event::MessageComplete), 2);
    assert_eq!(trace.count(&Event::MessageBegin), 3);
    assert_eq!(trace.count(&Event::Header(b"Host".to_vec(), b"x".to_vec())), 2);
}

/// Scenario 6: an invalid chunk size is terminal and the parser stays
/// dead afterwards.
#[test]
fn invalid_chunk_size_kills_parser() {
    let mut parser = tracing_parser();
    let result = parser.feed(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nZZ\r\n");

    assert_eq!(result, Err(ParseError::InvalidChunkSize));
    assert_eq!(
        parser.feed(b"GET / HTTP/1.1\r\n\r\n"),
        Err(ParseError::ParserDead),
        "a dead parser must refuse further input"
    );
}

/// Scenario 7: close-framed body is completed by an empty (EOF) feed and
/// surfaces the connection-closed signal exactly once.
#[test]
fn close_framed_body() {
    let mut parser = tracing_parser();
    parser
        .feed(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\nbody-bytes")
        .unwrap();

    assert_eq!(parser.feed(b""), Err(ParseError::ConnectionClosed));

    let trace = parser.handler();
    assert_eq!(trace.bodies(), b"body-bytes");
    assert_eq!(trace.count(&Event::MessageComplete), 1);
}

/// A close-framed body keeps accepting data across many feeds; the length
/// is defined only by EOF.
#[test]
fn close_framed_body_multiple_feeds() {
    let mut parser = tracing_parser();
    parser
        .feed(b"POST /upload HTTP/1.0\r\nConnection: close\r\n\r\n")
        .unwrap();
    parser.feed(b"first ").unwrap();
    parser.feed(b"second ").unwrap();
    parser.feed(b"third").unwrap();

    assert_eq!(parser.feed(b""), Err(ParseError::ConnectionClosed));
    assert_eq!(parser.handler().bodies(), b"first second third");
}

/// A request fragmented at every structural boundary still parses.
#[test]
fn fragmented_at_structural_boundaries() {
    let mut parser = tracing_parser();
    for piece in [
        b"POST" as &[u8],
        b" /submit",
        b" HTTP",
        b"/1.1\r",
        b"\n",
        b"Content-",
        b"Length",
        b": ",
        b"4",
        b"\r\n",
        b"\r\n",
        b"ab",
        b"cd",
    ] {
        parser.feed(piece).unwrap();
    }

    let trace = parser.handler();
    assert_eq!(trace.bodies(), b"abcd");
    assert_eq!(trace.count(&Event::MessageComplete), 1);
    assert_eq!(
        trace.count(&Event::Header(b"Content-Length".to_vec(), b"4".to_vec())),
        1
    );
}

/// Upgrade: the handler leaves HTTP after the first message; bytes after
/// the message surface as raw leftover and the parser stays alive.
#[test]
fn upgrade_surfaces_raw_leftover() {
    #[derive(Default)]
    struct UpgradeOnce {
        completed: usize,
    }

    impl Handler for UpgradeOnce {
        fn on_message_complete(&mut self) -> CallbackResult {
            self.completed += 1;
            Ok(Control::Upgrade)
        }
    }

    let mut parser = Parser::new(UpgradeOnce::default(), ParserConfig::default()).unwrap();
    let status = parser
        .feed(b"GET /socket HTTP/1.1\r\nUpgrade: frame-proto\r\n\r\n\x00\x01binary")
        .unwrap();

    match status {
        FeedStatus::Upgrade { leftover } => assert_eq!(leftover, b"\x00\x01binary"),
        FeedStatus::Advanced => panic!("expected an upgrade status"),
    }
    assert_eq!(parser.handler().completed, 1);
}

/// Zero-copy discipline: handlers copy what they keep, so overwriting the
/// input buffer after `feed` returns must not corrupt recorded state.
#[test]
fn recorded_state_survives_input_reuse() {
    let mut buffer = b"GET /keep HTTP/1.1\r\nHost: original\r\n\r\n".to_vec();

    let mut parser = tracing_parser();
    parser.feed(&buffer).unwrap();

    // clobber the transport buffer, as a real connection loop would when
    // reading the next segment
    buffer.iter_mut().for_each(|byte| *byte = b'#');

    let trace = parser.handler();
    assert_eq!(
        trace.count(&Event::Header(b"Host".to_vec(), b"original".to_vec())),
        1
    );
    assert_eq!(trace.count(&Event::Path(b"/keep".to_vec())), 1);
}

/// Mixed pipeline: a chunked message followed by a counted one in a
/// single slice.
#[test]
fn pipelined_chunked_then_counted() {
    let mut parser = tracing_parser();
    parser
        .feed(
            b"POST /a HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n\
              3\r\nabc\r\n0\r\n\r\n\
              POST /b HTTP/1.1\r\nContent-Length: 3\r\n\r\nxyz",
        )
        .unwrap();

    let trace = parser.handler();
    assert_eq!(trace.bodies(), b"abcxyz");
    assert_eq!(trace.count(&Event::MessageComplete), 2);
    assert_eq!(trace.count(&Event::Path(b"/b".to_vec())), 1);
}
