//! Utility macros and functions shared by the codec and protocol modules.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns `Err($error)` instead of panicking.
///
/// ```ignore
/// ensure!(block.len() <= self.max_header_bytes, ParseError::too_large_header(block.len(), self.max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Decodes header text byte by byte as ISO-8859-1.
///
/// Handshake header text is ASCII. Bytes above `0x7F` map to the code point of
/// equal value, so decoding never fails and is reversible.
pub(crate) fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
