//! Raw HTTP/1.x request parsing.
//!
//! # Responsibilities
//! - Parse the request line and headers with `httparse`
//! - Decode the body according to its framing (chunked, Content-Length, none)
//! - Split the request target into host and path + query
//!
//! # Design Decisions
//! - Bare LF line endings are accepted; hand-written requests rarely carry CR
//! - Anything after the framed body is ignored

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use thiserror::Error;

/// Upper bound on request header lines.
pub const MAX_HEADERS: usize = 128;

/// Reasons the input is not a usable HTTP request.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request head: {0}")]
    Head(#[from] httparse::Error),

    #[error("request head is incomplete")]
    IncompleteHead,

    #[error("invalid method {0:?}")]
    InvalidMethod(String),

    #[error("unsupported HTTP version 1.{0}")]
    UnsupportedVersion(u8),

    #[error("unsupported request target {0:?}")]
    UnsupportedTarget(String),

    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    #[error("invalid Content-Length {0:?}")]
    InvalidContentLength(String),

    #[error("unsupported Transfer-Encoding {0:?}")]
    UnsupportedTransferEncoding(String),

    #[error("body is truncated: expected {expected} bytes, got {actual}")]
    TruncatedBody { expected: u64, actual: usize },

    #[error("malformed chunked body")]
    InvalidChunk,
}

/// A request exactly as read from the input.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    /// Path plus optional query, always origin-form.
    pub target: String,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Host from the absolute-form target, else from the `Host` header.
    pub host: Option<String>,
}

impl RawRequest {
    /// Path component of the target.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Raw query string of the target, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }
}

/// Parse a complete request from `buf`.
pub fn parse_request(buf: &[u8]) -> Result<RawRequest, ParseError> {
    let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut slots);

    let head_len = match req.parse(buf)? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Err(ParseError::IncompleteHead),
    };

    // Complete parses always populate method, path and version.
    let method_str = req.method.unwrap_or_default();
    let method = Method::from_bytes(method_str.as_bytes())
        .map_err(|_| ParseError::InvalidMethod(method_str.to_string()))?;
    let version = match req.version.unwrap_or(1) {
        0 => Version::HTTP_10,
        1 => Version::HTTP_11,
        other => return Err(ParseError::UnsupportedVersion(other)),
    };

    let mut headers = HeaderMap::with_capacity(req.headers.len());
    for header in req.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| ParseError::InvalidHeader(header.name.to_string()))?;
        let value = HeaderValue::from_bytes(header.value)
            .map_err(|_| ParseError::InvalidHeader(header.name.to_string()))?;
        headers.append(name, value);
    }

    let (host, target) = split_target(req.path.unwrap_or_default(), &headers)?;
    let body = read_body(&headers, &buf[head_len..])?;

    Ok(RawRequest {
        method,
        target,
        version,
        headers,
        body,
        host,
    })
}

/// Separate host and origin-form target.
fn split_target(
    target: &str,
    headers: &HeaderMap,
) -> Result<(Option<String>, String), ParseError> {
    if target.starts_with('/') {
        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);
        return Ok((host, target.to_string()));
    }

    let uri: Uri = target
        .parse()
        .map_err(|_| ParseError::UnsupportedTarget(target.to_string()))?;
    match (uri.scheme(), uri.authority()) {
        (Some(_), Some(authority)) => {
            let path = uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .filter(|pq| pq.starts_with('/'))
                .unwrap_or("/");
            Ok((Some(authority.as_str().to_string()), path.to_string()))
        }
        _ => Err(ParseError::UnsupportedTarget(target.to_string())),
    }
}

fn read_body(headers: &HeaderMap, rest: &[u8]) -> Result<Bytes, ParseError> {
    if let Some(coding) = final_transfer_coding(headers) {
        if coding.eq_ignore_ascii_case("chunked") {
            return decode_chunked(rest);
        }
        return Err(ParseError::UnsupportedTransferEncoding(coding));
    }

    match content_length(headers)? {
        Some(len) => {
            let available = rest.len();
            let len_usize = usize::try_from(len).unwrap_or(usize::MAX);
            if available < len_usize {
                return Err(ParseError::TruncatedBody {
                    expected: len,
                    actual: available,
                });
            }
            Ok(Bytes::copy_from_slice(&rest[..len_usize]))
        }
        None => Ok(Bytes::new()),
    }
}

/// The last coding listed across all Transfer-Encoding headers.
fn final_transfer_coding(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .last()
        .map(str::to_string)
}

/// Content-Length, requiring every copy to agree.
fn content_length(headers: &HeaderMap) -> Result<Option<u64>, ParseError> {
    let mut found: Option<u64> = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let text = value
            .to_str()
            .map_err(|_| ParseError::InvalidContentLength(format!("{value:?}")))?;
        for part in text.split(',') {
            let len: u64 = part
                .trim()
                .parse()
                .map_err(|_| ParseError::InvalidContentLength(text.to_string()))?;
            match found {
                Some(prev) if prev != len => {
                    return Err(ParseError::InvalidContentLength(text.to_string()))
                }
                _ => found = Some(len),
            }
        }
    }
    Ok(found)
}

fn decode_chunked(mut rest: &[u8]) -> Result<Bytes, ParseError> {
    let mut body = Vec::new();
    loop {
        let (consumed, size) = match httparse::parse_chunk_size(rest) {
            Ok(httparse::Status::Complete(parsed)) => parsed,
            _ => return Err(ParseError::InvalidChunk),
        };
        rest = &rest[consumed..];

        if size == 0 {
            skip_trailers(rest);
            return Ok(Bytes::from(body));
        }

        let size = usize::try_from(size).map_err(|_| ParseError::InvalidChunk)?;
        if rest.len() < size {
            return Err(ParseError::InvalidChunk);
        }
        body.extend_from_slice(&rest[..size]);
        rest = &rest[size..];

        rest = rest
            .strip_prefix(b"\r\n")
            .or_else(|| rest.strip_prefix(b"\n"))
            .ok_or(ParseError::InvalidChunk)?;
    }
}

/// Trailer fields are not forwarded; consume them up to the blank line or EOF.
fn skip_trailers(mut rest: &[u8]) {
    while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
        let line = &rest[..pos];
        rest = &rest[pos + 1..];
        if line.is_empty() || line == b"\r" {
            break;
        }
        tracing::debug!(trailer = %String::from_utf8_lossy(line).trim_end(), "Dropping chunked trailer");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lf_only_request() {
        let req = parse_request(b"GET /x?a=1 HTTP/1.1\nHost: example.com\n\n").unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.target, "/x?a=1");
        assert_eq!(req.path(), "/x");
        assert_eq!(req.query(), Some("a=1"));
        assert_eq!(req.version, Version::HTTP_11);
        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_content_length_body() {
        let req = parse_request(
            b"POST /submit HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello world",
        )
        .unwrap();
        assert_eq!(&req.body[..], b"hello");
    }

    #[test]
    fn test_truncated_body() {
        let err = parse_request(b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 10\r\n\r\nabc")
            .unwrap_err();
        assert!(matches!(err, ParseError::TruncatedBody { expected: 10, actual: 3 }));
    }

    #[test]
    fn test_conflicting_content_length() {
        let err = parse_request(
            b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 1\r\nContent-Length: 2\r\n\r\nab",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength(_)));
    }

    #[test]
    fn test_chunked_body() {
        let req = parse_request(
            b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n\
              5\r\nhello\r\n6;ext=1\r\n world\r\n0\r\nX-Trailer: t\r\n\r\n",
        )
        .unwrap();
        assert_eq!(&req.body[..], b"hello world");
        // Framing headers stay visible on the raw request.
        assert!(req.headers.contains_key(TRANSFER_ENCODING));
    }

    #[test]
    fn test_bad_chunk() {
        let err = parse_request(
            b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\nhello\r\n",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidChunk));
    }

    #[test]
    fn test_multi_valued_headers() {
        let req = parse_request(
            b"GET / HTTP/1.1\r\nHost: h\r\nAccept: a\r\nAccept: b\r\n\r\n",
        )
        .unwrap();
        let values: Vec<_> = req.headers.get_all("accept").iter().collect();
        assert_eq!(values, ["a", "b"]);
    }

    #[test]
    fn test_absolute_form_target() {
        let req = parse_request(b"GET http://other.test:8080/p?q=1 HTTP/1.1\r\nHost: h\r\n\r\n")
            .unwrap();
        assert_eq!(req.host.as_deref(), Some("other.test:8080"));
        assert_eq!(req.target, "/p?q=1");
    }

    #[test]
    fn test_missing_host_still_parses() {
        let req = parse_request(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(req.version, Version::HTTP_10);
        assert!(req.host.is_none());
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse_request(b"this is not http\r\n\r\n").is_err());
        assert!(matches!(
            parse_request(b"GET / HTTP/1.1\r\nHost: h\r\n"),
            Err(ParseError::IncompleteHead)
        ));
        assert!(matches!(
            parse_request(b"OPTIONS * HTTP/1.1\r\nHost: h\r\n\r\n"),
            Err(ParseError::UnsupportedTarget(_))
        ));
    }
}
