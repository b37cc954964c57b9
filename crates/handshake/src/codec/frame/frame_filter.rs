//! Data-phase filter decoding RFC 6455 frames.
//!
//! Installed by the handshake filter once the handshake has been decoded. Each
//! call decodes at most one frame; a frame whose header or payload has not fully
//! arrived yet is left untouched in the cursor.
//!
//! Extensions are not negotiated, so reserved bits must be zero. Masked and
//! unmasked frames are both accepted; masked payloads are unmasked before they
//! are handed out.

use bytes::BytesMut;
use tracing::trace;
use triomphe::Arc;

use crate::codec::{ByteCursor, DataPhaseFilter, Filtered, PipelineFilter};
use crate::ensure;
use crate::protocol::{Frame, HandshakeHeader, Message, OpCode, ParseError};

/// Default maximum payload size of a single frame
pub const DEFAULT_MAX_FRAME_SIZE: u64 = 1024 * 1024;

const FIN_BIT: u8 = 0x80;
const RSV_BITS: u8 = 0x70;
const OPCODE_BITS: u8 = 0x0F;
const MASK_BIT: u8 = 0x80;
const PAYLOAD_LEN_BITS: u8 = 0x7F;

const MASK_KEY_LEN: usize = 4;
const MAX_CONTROL_PAYLOAD: u8 = 125;

/// Frame decoder for the data phase of a connection.
#[derive(Debug)]
pub struct FrameFilter {
    handshake: Arc<HandshakeHeader>,
    max_frame_size: u64,
}

impl FrameFilter {
    pub fn new(handshake: Arc<HandshakeHeader>) -> Self {
        Self { handshake, max_frame_size: DEFAULT_MAX_FRAME_SIZE }
    }

    /// Sets the largest payload accepted in one frame.
    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: u64) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn max_frame_size(&self) -> u64 {
        self.max_frame_size
    }
}

impl DataPhaseFilter for FrameFilter {
    fn from_handshake(header: Arc<HandshakeHeader>) -> Self {
        Self::new(header)
    }
}

impl PipelineFilter for FrameFilter {
    fn filter(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Option<Filtered>, ParseError> {
        let Some(head) = cursor.peek(2) else {
            return Ok(None);
        };

        let fin = head[0] & FIN_BIT != 0;
        ensure!(head[0] & RSV_BITS == 0, ParseError::invalid_frame("reserved bits set without a negotiated extension"));

        let opcode = OpCode::try_from(head[0] & OPCODE_BITS)
            .map_err(|code| ParseError::invalid_frame(format!("unknown opcode {code:#x}")))?;
        let masked = head[1] & MASK_BIT != 0;
        let length_code = head[1] & PAYLOAD_LEN_BITS;

        if opcode.is_control() {
            ensure!(fin, ParseError::invalid_frame("fragmented control frame"));
            ensure!(length_code <= MAX_CONTROL_PAYLOAD, ParseError::invalid_frame("control frame payload exceeds 125 bytes"));
        }

        let extended_len = match length_code {
            126 => 2,
            127 => 8,
            _ => 0,
        };
        let header_len = 2 + extended_len + if masked { MASK_KEY_LEN } else { 0 };

        let Some(frame_header) = cursor.peek(header_len) else {
            return Ok(None);
        };

        let payload_len = match extended_len {
            2 => u64::from(u16::from_be_bytes([frame_header[2], frame_header[3]])),
            8 => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(&frame_header[2..10]);
                let length = u64::from_be_bytes(bytes);
                ensure!(length >> 63 == 0, ParseError::invalid_frame("most significant bit of payload length set"));
                length
            }
            _ => u64::from(length_code),
        };

        ensure!(payload_len <= self.max_frame_size, ParseError::too_large_frame(payload_len, self.max_frame_size));
        let payload_len = usize::try_from(payload_len).map_err(ParseError::invalid_frame)?;

        let mask_key = masked.then(|| {
            let mut key = [0u8; MASK_KEY_LEN];
            key.copy_from_slice(&frame_header[2 + extended_len..header_len]);
            key
        });

        let Some(raw) = cursor.read(header_len + payload_len) else {
            trace!(buffered = cursor.remaining(), needed = header_len + payload_len, "frame payload not complete");
            return Ok(None);
        };

        let mut payload = BytesMut::from(&raw[header_len..]);
        if let Some(key) = mask_key {
            unmask(&mut payload, key);
        }

        trace!(?opcode, fin, payload_len, "decoded frame");
        Ok(Some(Filtered::message(Message::Frame(Frame::new(fin, opcode, payload.freeze())))))
    }

    fn handshake(&self) -> Option<&Arc<HandshakeHeader>> {
        Some(&self.handshake)
    }
}

fn unmask(payload: &mut [u8], key: [u8; MASK_KEY_LEN]) {
    for (index, byte) in payload.iter_mut().enumerate() {
        *byte ^= key[index % MASK_KEY_LEN];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{HeaderItems, RequestLine};

    fn filter() -> FrameFilter {
        let header = HandshakeHeader::new(RequestLine::parse("GET /chat HTTP/1.1").unwrap(), HeaderItems::new());
        FrameFilter::from_handshake(Arc::new(header))
    }

    fn decode(filter: &mut FrameFilter, input: &[u8]) -> Result<Option<Frame>, ParseError> {
        let mut cursor = ByteCursor::from(input);
        let filtered = filter.filter(&mut cursor)?;
        Ok(filtered.map(|filtered| {
            let (message, next_filter) = filtered.into_parts();
            assert!(next_filter.is_none());
            message.into_frame().unwrap()
        }))
    }

    #[test]
    fn unmasked_text_frame() {
        let frame = decode(&mut filter(), b"\x81\x05Hello").unwrap().unwrap();
        assert!(frame.is_fin());
        assert_eq!(frame.opcode(), OpCode::Text);
        assert_eq!(frame.as_text().unwrap(), "Hello");
    }

    #[test]
    fn masked_text_frame() {
        let input = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
        let frame = decode(&mut filter(), &input).unwrap().unwrap();
        assert_eq!(frame.as_text().unwrap(), "Hello");
    }

    #[test]
    fn fragmented_text_frames() {
        let mut filter = filter();
        let first = decode(&mut filter, b"\x01\x03Hel").unwrap().unwrap();
        let last = decode(&mut filter, b"\x80\x02lo").unwrap().unwrap();

        assert!(!first.is_fin());
        assert_eq!(first.opcode(), OpCode::Text);
        assert!(last.is_fin());
        assert_eq!(last.opcode(), OpCode::Continuation);
    }

    #[test]
    fn sixteen_bit_length() {
        let mut input = vec![0x82, 0x7E, 0x01, 0x00];
        input.extend(std::iter::repeat_n(0xAB, 256));

        let frame = decode(&mut filter(), &input).unwrap().unwrap();
        assert_eq!(frame.opcode(), OpCode::Binary);
        assert_eq!(frame.payload().len(), 256);
        assert!(frame.payload().iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn sixty_four_bit_length() {
        let mut input = vec![0x82, 0x7F, 0, 0, 0, 0, 0, 0, 0x01, 0x00];
        input.extend(std::iter::repeat_n(0x01, 256));

        let frame = decode(&mut filter(), &input).unwrap().unwrap();
        assert_eq!(frame.payload().len(), 256);
    }

    #[test]
    fn partial_frame_consumes_nothing() {
        let input = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];
        let mut filter = filter();

        for len in 0..input.len() {
            let mut cursor = ByteCursor::from(&input[..len]);
            assert!(filter.filter(&mut cursor).unwrap().is_none(), "prefix of {len} bytes");
            assert_eq!(cursor.consumed(), 0);
        }
    }

    #[test]
    fn frame_split_across_segments() {
        let input = [0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58, 0x89, 0x00];
        let mut filter = filter();
        let mut cursor = ByteCursor::new([&input[..3], &input[3..7], &input[7..]]);

        let (message, _) = filter.filter(&mut cursor).unwrap().unwrap().into_parts();
        assert_eq!(message.into_frame().unwrap().as_text().unwrap(), "Hello");
        assert_eq!(cursor.consumed(), 11);

        let (message, _) = filter.filter(&mut cursor).unwrap().unwrap().into_parts();
        assert_eq!(message.into_frame().unwrap().opcode(), OpCode::Ping);
        assert!(cursor.is_empty());
    }

    #[test]
    fn reject_reserved_bits() {
        let error = decode(&mut filter(), b"\xC1\x00").unwrap_err();
        assert!(matches!(error, ParseError::InvalidFrame { .. }));
    }

    #[test]
    fn reject_unknown_opcode() {
        let error = decode(&mut filter(), b"\x83\x00").unwrap_err();
        assert!(matches!(error, ParseError::InvalidFrame { reason } if reason.contains("0x3")));
    }

    #[test]
    fn reject_invalid_control_frames() {
        assert!(decode(&mut filter(), b"\x09\x00").is_err());
        assert!(decode(&mut filter(), b"\x89\x7E\x00\x80").is_err());
    }

    #[test]
    fn reject_oversized_frame() {
        let mut filter = filter().with_max_frame_size(4);
        assert_eq!(filter.max_frame_size(), 4);

        let error = decode(&mut filter, b"\x82\x05").unwrap_err();
        assert!(matches!(error, ParseError::TooLargeFrame { size: 5, max_size: 4 }));
    }

    #[test]
    fn keeps_handshake() {
        let filter = filter();
        assert_eq!(filter.handshake().unwrap().target(), "/chat");
    }
}
