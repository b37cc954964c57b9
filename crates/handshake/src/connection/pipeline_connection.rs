use std::sync::Arc;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info};

use crate::codec::{ChainState, FilterChain};
use crate::handler::MessageHandler;
use crate::protocol::{Message, OpCode, PipelineError};

/// Default capacity of the read buffer
const DEFAULT_READ_CAPACITY: usize = 8 * 1024;

/// A connection that decodes its byte stream through a [`FilterChain`]
///
/// The first decoded message is the handshake; every later message comes from
/// the data-phase filter installed by the handshake. Each message is passed to
/// the handler in arrival order.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
///
pub struct PipelineConnection<R> {
    framed_read: FramedRead<R, FilterChain>,
}

impl<R> PipelineConnection<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_READ_CAPACITY)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self::with_chain(reader, FilterChain::new(), capacity)
    }

    pub fn with_chain(reader: R, chain: FilterChain, capacity: usize) -> Self {
        Self { framed_read: FramedRead::with_capacity(reader, chain, capacity) }
    }

    pub fn state(&self) -> ChainState {
        self.framed_read.decoder().state()
    }

    /// Decodes messages until the stream ends, a close frame arrives, or an error occurs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Parse`] if the input can not be decoded and
    /// [`PipelineError::Handler`] if the handler fails.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), PipelineError>
    where
        H: MessageHandler,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(message)) => {
                    let is_close = matches!(&message, Message::Frame(frame) if frame.opcode() == OpCode::Close);

                    if let Message::Handshake(header) = &message {
                        info!(method = header.method(), path = header.target(), upgrade = header.is_websocket_upgrade(), "receive handshake");
                    }

                    handler.call(message).await.map_err(PipelineError::handler)?;

                    if is_close {
                        info!("receive close frame, connection shutdown");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, state = ?self.state(), "can't decode next message");
                    return Err(e.into());
                }

                None => {
                    debug!(state = ?self.state(), "cant read more message, break this connection down");
                    return Ok(());
                }
            }
        }
    }
}

impl<R> std::fmt::Debug for PipelineConnection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConnection").field("chain", self.framed_read.decoder()).finish_non_exhaustive()
    }
}
