use std::error::Error;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("decode error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("handler error: {source}")]
    Handler { source: Box<dyn Error + Send + Sync> },
}

impl PipelineError {
    pub fn handler<E: Into<Box<dyn Error + Send + Sync>>>(e: E) -> Self {
        Self::Handler { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("frame size too large, current: {size} exceed the limit {max_size}")]
    TooLargeFrame { size: u64, max_size: u64 },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_frame<S: ToString>(str: S) -> Self {
        Self::InvalidFrame { reason: str.to_string() }
    }

    pub fn too_large_frame(size: u64, max_size: u64) -> Self {
        Self::TooLargeFrame { size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true if the request line could not be split into three tokens
    #[inline]
    pub fn is_malformed_request_line(&self) -> bool {
        matches!(self, ParseError::MalformedRequestLine { .. })
    }
}
