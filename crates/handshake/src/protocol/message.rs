use triomphe::Arc;

use crate::protocol::{Frame, HandshakeHeader};

/// A unit decoded from a connection's byte stream.
///
/// The first message of every connection is a [`Message::Handshake`]; once it
/// has been produced every later message comes from the data-phase filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The decoded handshake request, shared with the data-phase filter
    Handshake(Arc<HandshakeHeader>),
    /// A frame produced by the data-phase filter
    Frame(Frame),
}

impl Message {
    /// Returns true if this message is the handshake request
    #[inline]
    pub fn is_handshake(&self) -> bool {
        matches!(self, Message::Handshake(_))
    }

    /// Returns true if this message is a data-phase frame
    #[inline]
    pub fn is_frame(&self) -> bool {
        matches!(self, Message::Frame(_))
    }

    /// Returns the handshake header if this is a handshake message
    pub fn as_handshake(&self) -> Option<&HandshakeHeader> {
        match self {
            Message::Handshake(header) => Some(&**header),
            Message::Frame(_) => None,
        }
    }

    /// Consumes the message and returns the frame if this is a data-phase frame
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Message::Handshake(_) => None,
            Message::Frame(frame) => Some(frame),
        }
    }
}

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        Self::Frame(frame)
    }
}
