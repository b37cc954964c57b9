//! Protocol types produced by the pipeline filters.
//!
//! - **Handshake model** ([`header`]): the decoded request line and headers
//!   - [`HandshakeHeader`]: immutable result of a complete handshake decode
//!   - [`RequestLine`]: exactly three start line tokens
//!   - [`HeaderItems`]: ordered, case-preserving, accumulated header values
//!
//! - **Messages** ([`message`]): what the filter chain yields per decode step
//!   - [`Message`]: either the handshake or a data-phase [`Frame`]
//!
//! - **Error Handling** ([`error`]):
//!   - [`ParseError`]: decoding errors
//!   - [`PipelineError`]: connection level errors

mod message;
pub use message::Message;

mod header;
pub use header::HandshakeHeader;
pub use header::HeaderItems;
pub use header::RequestLine;

mod frame;
pub use frame::Frame;
pub use frame::OpCode;

mod error;
pub use error::ParseError;
pub use error::PipelineError;
