//! The per-connection filter slot.
//!
//! [`FilterChain`] holds the single active [`PipelineFilter`] of a connection
//! and drives it, either directly over a [`ByteCursor`] or through the
//! [`Decoder`] implementation used with `FramedRead`.
//!
//! # State Machine
//!
//! - [`ChainState::AwaitingHandshake`]: the handshake filter is active
//! - [`ChainState::DataPhase`]: a data-phase filter has taken over; there is no
//!   way back, a new handshake needs a new connection
//!
//! The transition happens when the active filter returns a [`Filtered`] that
//! carries a next filter. The message of that step is still returned to the
//! caller; only later input goes to the new filter.
//!
//! [`Filtered`]: crate::codec::Filtered

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::frame::FrameFilter;
use crate::codec::handshake::HandshakeFilter;
use crate::codec::{ByteCursor, PipelineFilter};
use crate::protocol::{Message, ParseError};

/// Phase of a connection as seen by its filter chain
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChainState {
    AwaitingHandshake,
    DataPhase,
}

/// Holds the active filter of one connection and applies handoffs.
#[derive(Debug)]
pub struct FilterChain {
    current: Box<dyn PipelineFilter>,
    state: ChainState,
}

impl FilterChain {
    /// Creates a chain that starts with a [`HandshakeFilter`] handing off to a [`FrameFilter`].
    pub fn new() -> Self {
        Self::with_filter(HandshakeFilter::<FrameFilter>::new())
    }

    /// Creates a chain that starts with `filter`.
    pub fn with_filter<F: PipelineFilter + 'static>(filter: F) -> Self {
        Self { current: Box::new(filter), state: ChainState::AwaitingHandshake }
    }

    /// The filter that receives the next input.
    pub fn current(&self) -> &dyn PipelineFilter {
        self.current.as_ref()
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Runs the active filter once over `cursor`.
    ///
    /// When the filter needs more data the cursor is left exactly where it was,
    /// and on error the slot is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] reported by the active filter.
    pub fn filter(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Option<Message>, ParseError> {
        let start = cursor.position();
        let Some(filtered) = self.current.filter(cursor)? else {
            cursor.reset(start);
            return Ok(None);
        };

        let (message, next_filter) = filtered.into_parts();

        if let Some(next_filter) = next_filter {
            self.replace(next_filter);
        }

        Ok(Some(message))
    }

    fn replace(&mut self, next_filter: Box<dyn PipelineFilter>) {
        debug!(from = ?self.state, to = ?ChainState::DataPhase, "filter handoff");
        self.current = next_filter;
        self.state = ChainState::DataPhase;
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FilterChain {
    type Item = Message;
    type Error = ParseError;

    /// Decodes one message from the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))`: a message was decoded and its bytes removed from `src`
    /// - `Ok(None)`: more data is needed; `src` is untouched
    /// - `Err(_)`: decoding failed; bytes the filter processed are removed from `src`
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut cursor = ByteCursor::from(&src[..]);
        let result = self.filter(&mut cursor);
        let consumed = cursor.consumed();

        src.advance(consumed);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DataPhaseFilter, Filtered};
    use crate::protocol::{Frame, HandshakeHeader, OpCode};
    use bytes::Bytes;
    use triomphe::Arc;

    const HANDSHAKE: &[u8] = b"GET /chat HTTP/1.1\r\nHost: x\r\n\r\n";

    #[test]
    fn handoff_happens_once() {
        let mut chain = FilterChain::new();
        assert_eq!(chain.state(), ChainState::AwaitingHandshake);
        assert!(chain.current().handshake().is_none());

        let mut buf = BytesMut::from(HANDSHAKE);
        buf.extend_from_slice(b"\x81\x02hi\x81\x02yo");

        let message = chain.decode(&mut buf).unwrap().unwrap();
        let header = message.as_handshake().unwrap();
        assert_eq!(header.headers().iter().collect::<Vec<_>>(), vec![("Host", "x")]);

        assert_eq!(chain.state(), ChainState::DataPhase);
        let installed = chain.current().handshake().unwrap();
        assert_eq!(installed.headers().get("Host"), Some("x"));
        assert_eq!(&**installed, header);

        for expected in ["hi", "yo"] {
            let frame = chain.decode(&mut buf).unwrap().unwrap().into_frame().unwrap();
            assert_eq!(frame.as_text().unwrap(), expected);
            assert_eq!(chain.state(), ChainState::DataPhase);
        }

        assert!(buf.is_empty());
        assert!(chain.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn second_handshake_goes_to_data_phase_filter() {
        let mut chain = FilterChain::new();
        let mut buf = BytesMut::from(HANDSHAKE);
        buf.extend_from_slice(HANDSHAKE);

        assert!(chain.decode(&mut buf).unwrap().unwrap().is_handshake());

        // `G` has a reserved bit set when read as a frame header
        assert!(matches!(chain.decode(&mut buf), Err(ParseError::InvalidFrame { .. })));
        assert_eq!(chain.state(), ChainState::DataPhase);
    }

    #[test]
    fn incomplete_leaves_buffer_untouched() {
        let mut chain = FilterChain::new();
        let mut buf = BytesMut::from(&HANDSHAKE[..HANDSHAKE.len() - 1]);

        for _ in 0..3 {
            assert!(chain.decode(&mut buf).unwrap().is_none());
            assert_eq!(buf.len(), HANDSHAKE.len() - 1);
            assert_eq!(chain.state(), ChainState::AwaitingHandshake);
        }
    }

    #[test]
    fn byte_by_byte_feed() {
        let mut chain = FilterChain::new();
        let mut buf = BytesMut::new();
        let mut messages = Vec::new();

        for byte in HANDSHAKE.iter().chain(b"\x81\x01!") {
            buf.extend_from_slice(&[*byte]);
            if let Some(message) = chain.decode(&mut buf).unwrap() {
                messages.push(message);
            }
        }

        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_handshake());
        assert_eq!(messages[1].clone().into_frame().unwrap().payload(), &Bytes::from_static(b"!"));
    }

    #[test]
    fn malformed_request_line_keeps_handshake_filter() {
        let mut chain = FilterChain::new();
        let mut buf = BytesMut::from(&b"BADLINE\r\n\r\nrest"[..]);

        let error = chain.decode(&mut buf).unwrap_err();
        assert!(error.is_malformed_request_line());
        assert_eq!(chain.state(), ChainState::AwaitingHandshake);
        assert!(chain.current().handshake().is_none());
        assert_eq!(&buf[..], b"rest");
    }

    #[test]
    fn segmented_cursor_handoff() {
        let mut chain = FilterChain::new();
        let mut cursor = ByteCursor::new([&HANDSHAKE[..5], &HANDSHAKE[5..20], &HANDSHAKE[20..], &b"\x8A\x00"[..]]);

        assert!(chain.filter(&mut cursor).unwrap().unwrap().is_handshake());
        assert_eq!(cursor.consumed(), HANDSHAKE.len());

        let frame = chain.filter(&mut cursor).unwrap().unwrap().into_frame().unwrap();
        assert_eq!(frame.opcode(), OpCode::Pong);
        assert!(cursor.is_empty());
    }

    /// Hands out everything buffered as one binary frame.
    #[derive(Debug)]
    struct RawFilter {
        handshake: Arc<HandshakeHeader>,
    }

    impl DataPhaseFilter for RawFilter {
        fn from_handshake(header: Arc<HandshakeHeader>) -> Self {
            Self { handshake: header }
        }
    }

    impl PipelineFilter for RawFilter {
        fn filter(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Option<Filtered>, ParseError> {
            if cursor.is_empty() {
                return Ok(None);
            }
            let payload = Bytes::copy_from_slice(&cursor.rest());
            cursor.advance(payload.len());
            Ok(Some(Filtered::message(Frame::new(true, OpCode::Binary, payload).into())))
        }

        fn handshake(&self) -> Option<&Arc<HandshakeHeader>> {
            Some(&self.handshake)
        }
    }

    #[test]
    fn custom_data_phase_filter() {
        let mut chain = FilterChain::with_filter(HandshakeFilter::<RawFilter>::new());
        let mut buf = BytesMut::from(HANDSHAKE);
        buf.extend_from_slice(b"anything");

        assert!(chain.decode(&mut buf).unwrap().unwrap().is_handshake());
        assert_eq!(chain.current().handshake().unwrap().target(), "/chat");

        let frame = chain.decode(&mut buf).unwrap().unwrap().into_frame().unwrap();
        assert_eq!(&frame.payload()[..], b"anything");
    }

    #[derive(Debug)]
    struct MisbehavingFilter;

    impl PipelineFilter for MisbehavingFilter {
        fn filter(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Option<Filtered>, ParseError> {
            cursor.advance(cursor.remaining());
            Ok(None)
        }
    }

    #[test]
    fn incomplete_never_moves_cursor() {
        let mut chain = FilterChain::with_filter(MisbehavingFilter);
        let mut buf = BytesMut::from(&b"abc"[..]);

        assert!(chain.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"abc");

        let mut cursor = ByteCursor::new([&b"ab"[..], &b"cd"[..]]);
        cursor.advance(1);
        assert!(chain.filter(&mut cursor).unwrap().is_none());
        assert_eq!(cursor.consumed(), 1);
        assert_eq!(cursor.rest().as_ref(), b"bcd");
    }
}
