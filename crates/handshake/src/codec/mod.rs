//! Pipeline filters that turn a connection's byte stream into messages
//!
//! A connection starts in handshake mode and switches, exactly once, to a
//! data-phase decoder as soon as the handshake request has been decoded. The
//! switch is performed by the filter itself: a successful decode step returns
//! the decoded message together with the filter that replaces it.
//!
//! # Architecture
//!
//! - [`ByteCursor`]: resumable reader over contiguous or segmented input
//! - [`PipelineFilter`]: one decoding strategy, with [`Filtered`] as the outcome
//!   of a successful step
//! - [`FilterChain`]: the per-connection slot holding the active filter;
//!   implements [`tokio_util::codec::Decoder`]
//! - [`HandshakeFilter`]: decodes the handshake and performs the handoff
//! - [`DataPhaseFilter`] / [`FrameFilter`]: what the handshake hands off to
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use micro_handshake::codec::{ChainState, FilterChain};
//! use tokio_util::codec::Decoder;
//!
//! let mut chain = FilterChain::new();
//! let mut buffer = BytesMut::from(&b"GET /chat HTTP/1.1\r\nHost: x\r\n"[..]);
//! assert!(chain.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"\r\n\x81\x02hi");
//! let message = chain.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(message.as_handshake().unwrap().headers().get("Host"), Some("x"));
//! assert_eq!(chain.state(), ChainState::DataPhase);
//!
//! let frame = chain.decode(&mut buffer).unwrap().unwrap().into_frame().unwrap();
//! assert_eq!(frame.as_text().unwrap(), "hi");
//! ```

mod cursor;
mod filter;
mod filter_chain;
mod frame;
mod handshake;

pub use cursor::{ByteCursor, Position};
pub use filter::{DataPhaseFilter, Filtered, PipelineFilter};
pub use filter_chain::{ChainState, FilterChain};
pub use frame::{DEFAULT_MAX_FRAME_SIZE, FrameFilter};
pub use handshake::{DEFAULT_MAX_HEADER_BYTES, HandshakeFilter};
