//! Incremental handshake decoding with decoder handoff
//!
//! This crate decodes the opening handshake of a connection from a byte stream
//! that arrives in arbitrary chunks, and then switches the connection over to a
//! data-phase decoder built from the decoded handshake. The switch happens
//! exactly once per connection, as part of the decode step that produces the
//! handshake message.
//!
//! # Features
//!
//! - Resumable decoding: incomplete input is never consumed, so decoding is
//!   independent of where the transport splits reads
//! - Segmented input: delimiter scanning across non-contiguous buffers
//! - Ordered, case-preserving header model with continuation folding and
//!   accumulation of repeated headers
//! - Pluggable data-phase filter, with an RFC 6455 frame decoder by default
//! - `tokio_util::codec::Decoder` integration for use with `FramedRead`
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use micro_handshake::connection::PipelineConnection;
//! use micro_handshake::handler::make_handler;
//! use micro_handshake::protocol::Message;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8001").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(|message: Message| async move {
//!         info!(?message, "receive message");
//!         Ok::<_, Infallible>(())
//!     }));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             if let Err(e) = PipelineConnection::new(tcp_stream).process(handler).await {
//!                 error!("connection has error, cause {}", e);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: the cursor, the filter abstraction, the filter chain and the
//!   handshake and frame filters
//! - [`protocol`]: the handshake model, messages, frames and errors
//! - [`connection`]: drives a filter chain over an `AsyncRead`
//! - [`handler`]: the message handler trait
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: decoding errors
//! - [`protocol::PipelineError`]: connection level errors
//!
//! "Need more data" is not an error: filters return `Ok(None)` and leave their
//! input untouched.
//!
//! # Limitations
//!
//! - Maximum handshake size: 8KB by default
//! - Maximum frame payload: 1MB by default
//! - No handshake response is written; that belongs to the session layer

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
