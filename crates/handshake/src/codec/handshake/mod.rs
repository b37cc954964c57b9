//! Handshake decoding.
//!
//! - [`HandshakeFilter`]: decodes the header block that opens a connection
//!   - scans for the block terminator without consuming partial input
//!   - folds continuation lines and accumulates repeated headers
//!   - enforces a size limit on the block
//!   - hands the connection to a data-phase filter on success

mod handshake_filter;

pub use handshake_filter::DEFAULT_MAX_HEADER_BYTES;
pub use handshake_filter::HandshakeFilter;
