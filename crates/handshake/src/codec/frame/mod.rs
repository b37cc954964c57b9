//! Data-phase decoding.
//!
//! - [`FrameFilter`]: decodes frames after the handshake, constructed from the
//!   decoded [`HandshakeHeader`](crate::protocol::HandshakeHeader)

mod frame_filter;

pub use frame_filter::DEFAULT_MAX_FRAME_SIZE;
pub use frame_filter::FrameFilter;
