//! Handshake fixtures shared by the decoder benchmarks.

/// Masked text frame carrying "Hello"
pub const HELLO_FRAME: &[u8] = &[0x81, 0x85, 0x37, 0xfa, 0x21, 0x3d, 0x7f, 0x9f, 0x4d, 0x51, 0x58];

pub const SMALL_HANDSHAKE: Handshake =
    Handshake::new(HandshakeSize::Small, "small.txt", include_str!("../resources/handshake/small.txt"));

pub const LARGE_HANDSHAKE: Handshake =
    Handshake::new(HandshakeSize::Large, "large.txt", include_str!("../resources/handshake/large.txt"));

pub fn handshakes() -> [Handshake; 2] {
    [SMALL_HANDSHAKE, LARGE_HANDSHAKE]
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HandshakeSize {
    /// Request line and the headers a browser must send
    Small,
    /// Cookies, user agent and extension negotiation included
    Large,
}

impl HandshakeSize {
    pub fn label(self) -> &'static str {
        match self {
            HandshakeSize::Small => "small",
            HandshakeSize::Large => "large",
        }
    }
}

/// A handshake request read from `resources/handshake`, with CR LF line endings.
#[derive(Debug, Copy, Clone)]
pub struct Handshake {
    size: HandshakeSize,
    file_name: &'static str,
    content: &'static str,
}

impl Handshake {
    pub const fn new(size: HandshakeSize, file_name: &'static str, content: &'static str) -> Self {
        Self { size, file_name, content }
    }

    pub fn size(&self) -> HandshakeSize {
        self.size
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    /// The handshake followed by `frames` copies of [`HELLO_FRAME`].
    pub fn with_frames(&self, frames: usize) -> Vec<u8> {
        let mut input = Vec::with_capacity(self.content.len() + frames * HELLO_FRAME.len());
        input.extend_from_slice(self.content.as_bytes());
        for _ in 0..frames {
            input.extend_from_slice(HELLO_FRAME);
        }
        input
    }
}
