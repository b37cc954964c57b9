//! Handshake header block model.
//!
//! A handshake request is a request line of exactly three tokens followed by
//! header lines. Header names keep the case they were received with, and
//! repeated names are merged into one entry whose value is the `", "`-joined
//! accumulation of every occurrence, in arrival order.

use std::fmt;

use http::header::{CONNECTION, SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_VERSION, UPGRADE};
use http::{Request, Version};

use crate::protocol::ParseError;

/// Separator placed between values of a repeated header name.
const VALUE_SEPARATOR: &str = ", ";

/// The first line of a handshake request: method, target and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    version: String,
}

impl RequestLine {
    /// Splits `line` on single spaces into exactly three tokens.
    ///
    /// The third token keeps any further spaces, so `GET / HTTP/1.1 x` yields
    /// the version `HTTP/1.1 x`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MalformedRequestLine`] if the line is empty, has
    /// fewer than three tokens, or any token is empty.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.splitn(3, ' ');
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(method), Some(target), Some(version)) if !method.is_empty() && !target.is_empty() && !version.is_empty() => {
                Ok(Self { method: method.to_owned(), target: target.to_owned(), version: version.to_owned() })
            }
            _ => Err(ParseError::malformed_request_line(line)),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the three start line tokens in wire order.
    pub fn tokens(&self) -> [&str; 3] {
        [&self.method, &self.target, &self.version]
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

/// Ordered, case-preserving collection of header name to accumulated value.
///
/// Lookups through [`HeaderItems::get`] are case-sensitive, matching how names
/// are merged while decoding. Use [`HeaderItems::get_ignore_ascii_case`] for
/// protocol-level checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderItems {
    items: Vec<(String, String)>,
}

impl HeaderItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` under `name`.
    ///
    /// A name that is already present gets `", "` and the new value added to
    /// its accumulated value. Empty names are ignored.
    pub fn append(&mut self, name: &str, value: &str) {
        if name.is_empty() {
            return;
        }

        match self.position(name) {
            Some(index) => {
                let current = &mut self.items[index].1;
                current.push_str(VALUE_SEPARATOR);
                current.push_str(value);
            }
            None => self.items.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Appends a continuation line to the value of `name` with no separator.
    ///
    /// Does nothing if `name` is not present.
    pub(crate) fn fold(&mut self, name: &str, continuation: &str) {
        if let Some(index) = self.position(name) {
            self.items[index].1.push_str(continuation);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.items[index].1.as_str())
    }

    pub fn get_ignore_ascii_case(&self, name: &str) -> Option<&str> {
        self.items.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Iterates `(name, value)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|(key, _)| key == name)
    }
}

impl<N: AsRef<str>, V: AsRef<str>> FromIterator<(N, V)> for HeaderItems {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut items = HeaderItems::new();
        for (name, value) in iter {
            items.append(name.as_ref(), value.as_ref());
        }
        items
    }
}

/// A fully decoded handshake request.
///
/// Built once, when the whole header block has been received, and never
/// mutated afterwards. The decoder shares it between the handshake message and
/// the data-phase filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeHeader {
    request_line: RequestLine,
    headers: HeaderItems,
}

impl HandshakeHeader {
    pub fn new(request_line: RequestLine, headers: HeaderItems) -> Self {
        Self { request_line, headers }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    pub fn version(&self) -> &str {
        self.request_line.version()
    }

    pub fn headers(&self) -> &HeaderItems {
        &self.headers
    }

    /// Returns true if the request asks for a websocket upgrade.
    ///
    /// Requires `Upgrade: websocket` and an `upgrade` token in `Connection`,
    /// both compared case-insensitively.
    pub fn is_websocket_upgrade(&self) -> bool {
        let upgrade = self
            .headers
            .get_ignore_ascii_case(UPGRADE.as_str())
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("websocket"));

        let connection = self
            .headers
            .get_ignore_ascii_case(CONNECTION.as_str())
            .is_some_and(|value| value.split(',').any(|token| token.trim().eq_ignore_ascii_case("upgrade")));

        upgrade && connection
    }

    pub fn sec_websocket_key(&self) -> Option<&str> {
        self.headers.get_ignore_ascii_case(SEC_WEBSOCKET_KEY.as_str())
    }

    pub fn sec_websocket_version(&self) -> Option<&str> {
        self.headers.get_ignore_ascii_case(SEC_WEBSOCKET_VERSION.as_str())
    }

    /// Converts the handshake into an `http::Request<()>`.
    ///
    /// Header names are lowercased by the `http` crate; repeated names stay
    /// merged as one value.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidHeader`] if the version is unknown or the
    /// method, target or any header is rejected by the `http` crate.
    pub fn to_request(&self) -> Result<Request<()>, ParseError> {
        let version = match self.version() {
            "HTTP/0.9" => Version::HTTP_09,
            "HTTP/1.0" => Version::HTTP_10,
            "HTTP/1.1" => Version::HTTP_11,
            other => return Err(ParseError::invalid_header(format!("unsupported version {other}"))),
        };

        let mut builder = Request::builder().method(self.method()).uri(self.target()).version(version);
        for (name, value) in self.headers.iter() {
            builder = builder.header(name, value);
        }

        builder.body(()).map_err(ParseError::invalid_header)
    }
}
