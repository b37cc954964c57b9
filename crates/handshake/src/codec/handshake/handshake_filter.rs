//! Handshake filter implementation for decoding the opening request of a connection
//!
//! The handshake is a header block: a request line followed by header lines,
//! each terminated by CR LF, with the block itself terminated by an empty line.
//! The filter scans for the `CR LF CR LF` terminator as a single unit; until it
//! shows up nothing is consumed, so the transport can retry with more bytes
//! from the same starting point regardless of where chunks were split.
//!
//! # Header lines
//!
//! - a line starting with HT continues the previous header: its trimmed text is
//!   appended with no separator
//! - otherwise the line is split at the first colon; lines with no colon, a
//!   leading colon, a blank name or nothing after the colon are dropped
//! - the value loses at most one leading space
//! - repeated names accumulate as `first, second`
//!
//! # Limits
//!
//! - Maximum handshake size: 8KB by default, see [`HandshakeFilter::with_max_header_bytes`]

use std::marker::PhantomData;

use tracing::{debug, trace};
use triomphe::Arc;

use crate::codec::frame::FrameFilter;
use crate::codec::{ByteCursor, DataPhaseFilter, Filtered, PipelineFilter};
use crate::ensure;
use crate::protocol::{HandshakeHeader, HeaderItems, Message, ParseError, RequestLine};
use crate::utils::latin1_to_string;

/// Default maximum size in bytes of the whole handshake block
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

const LINE_SEPARATOR: &str = "\r\n";

const CONTINUATION: char = '\t';

/// Decodes the handshake request and hands the connection to `D`.
///
/// On success the filter yields [`Message::Handshake`] and replaces itself with
/// `D::from_handshake`, sharing the decoded header with the new filter.
#[derive(Debug)]
pub struct HandshakeFilter<D = FrameFilter> {
    max_header_bytes: usize,
    data_phase: PhantomData<fn() -> D>,
}

impl<D> HandshakeFilter<D> {
    pub fn new() -> Self {
        Self { max_header_bytes: DEFAULT_MAX_HEADER_BYTES, data_phase: PhantomData }
    }

    /// Sets the largest handshake block accepted, terminator excluded.
    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }
}

impl<D> Default for HandshakeFilter<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DataPhaseFilter> PipelineFilter for HandshakeFilter<D> {
    /// Attempts to decode the handshake request from `cursor`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(filtered))`: the handshake message plus the data-phase filter
    /// - `Ok(None)`: the terminator has not arrived yet, nothing consumed
    /// - `Err(ParseError)`: the request line is malformed or the block is too large
    ///
    /// Once the terminator is found the block counts as processed even if it
    /// turns out to be malformed.
    fn filter(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Option<Filtered>, ParseError> {
        let Some(block) = cursor.try_read_to(HEADER_TERMINATOR) else {
            // a block of exactly the limit may still be waiting for its last terminator byte
            let max_buffered = self.max_header_bytes.saturating_add(HEADER_TERMINATOR.len() - 1);
            ensure!(
                cursor.remaining() <= max_buffered,
                ParseError::too_large_header(cursor.remaining(), self.max_header_bytes)
            );
            trace!(buffered = cursor.remaining(), "handshake terminator not found");
            return Ok(None);
        };

        ensure!(block.len() <= self.max_header_bytes, ParseError::too_large_header(block.len(), self.max_header_bytes));

        let header = Arc::new(parse_handshake(&block)?);
        debug!(
            method = header.method(),
            target = header.target(),
            header_count = header.headers().len(),
            "decoded handshake"
        );

        let next_filter = D::from_handshake(Arc::clone(&header));
        Ok(Some(Filtered::handoff(Message::Handshake(header), next_filter)))
    }
}

/// Parses a complete header block, terminator excluded.
fn parse_handshake(block: &[u8]) -> Result<HandshakeHeader, ParseError> {
    let text = latin1_to_string(block);
    let mut lines = text.split(LINE_SEPARATOR);

    let request_line = RequestLine::parse(lines.next().unwrap_or_default())?;

    let mut headers = HeaderItems::new();
    let mut previous_name: Option<&str> = None;

    for line in lines {
        if line.is_empty() {
            break;
        }

        if line.starts_with(CONTINUATION) {
            match previous_name {
                Some(name) => headers.fold(name, line.trim_ascii()),
                None => trace!(line, "continuation without a previous header, dropped"),
            }
            continue;
        }

        match parse_header_line(line) {
            Some((name, value)) => {
                headers.append(name, value);
                previous_name = Some(name);
            }
            None => trace!(line, "header line without a name or value, dropped"),
        }
    }

    Ok(HandshakeHeader::new(request_line, headers))
}

/// Splits a header line into name and value, or `None` if the line has no usable name or no value.
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    if name.is_empty() || value.is_empty() {
        return None;
    }

    let name = name.trim_ascii();
    if name.is_empty() {
        return None;
    }

    // a lone space is kept as the value
    let value = value.strip_prefix(' ').filter(|rest| !rest.is_empty()).unwrap_or(value);
    Some((name, value))
}
