//! Connection driver
//!
//! - [`PipelineConnection`]: reads a stream through a
//!   [`FilterChain`](crate::codec::FilterChain) and hands each message to a
//!   [`MessageHandler`](crate::handler::MessageHandler)

mod pipeline_connection;

pub use pipeline_connection::PipelineConnection;
