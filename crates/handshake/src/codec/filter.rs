//! The pipeline filter abstraction.
//!
//! A connection always has exactly one active [`PipelineFilter`]. Each call to
//! [`PipelineFilter::filter`] either needs more data, yields a message, or
//! yields a message together with the filter that takes over the connection
//! from then on. The [`FilterChain`](crate::codec::FilterChain) applies that
//! replacement after the call returns.

use std::fmt;

use triomphe::Arc;

use crate::codec::ByteCursor;
use crate::protocol::{HandshakeHeader, Message, ParseError};

/// A decoding strategy for one phase of a connection.
pub trait PipelineFilter: fmt::Debug + Send {
    /// Attempts to decode one message from `cursor`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(filtered))`: a message was decoded and the cursor moved past it
    /// - `Ok(None)`: more data is needed; the cursor must not have moved
    /// - `Err(_)`: the input can not be decoded
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing why decoding failed.
    fn filter(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Option<Filtered>, ParseError>;

    /// The handshake this filter was constructed from, if any.
    fn handshake(&self) -> Option<&Arc<HandshakeHeader>> {
        None
    }
}

/// A filter that can take over a connection once the handshake is decoded.
///
/// The handshake header is the only configuration it is given.
pub trait DataPhaseFilter: PipelineFilter + Sized + 'static {
    fn from_handshake(header: Arc<HandshakeHeader>) -> Self;
}

/// The outcome of a successful [`PipelineFilter::filter`] call.
#[derive(Debug)]
pub struct Filtered {
    message: Message,
    next_filter: Option<Box<dyn PipelineFilter>>,
}

impl Filtered {
    /// A message that keeps the current filter in place.
    pub fn message(message: Message) -> Self {
        Self { message, next_filter: None }
    }

    /// A message after which `next_filter` replaces the current filter.
    pub fn handoff<F: PipelineFilter + 'static>(message: Message, next_filter: F) -> Self {
        Self { message, next_filter: Some(Box::new(next_filter)) }
    }

    pub fn is_handoff(&self) -> bool {
        self.next_filter.is_some()
    }

    pub fn into_parts(self) -> (Message, Option<Box<dyn PipelineFilter>>) {
        (self.message, self.next_filter)
    }
}
