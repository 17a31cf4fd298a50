//! Response as received from the peer.

use http::header::{CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, Method, StatusCode, Version};
use hyper::body::Incoming;

use crate::net::TlsSummary;

/// Head of the response plus its unread body.
#[derive(Debug)]
pub struct ReceivedResponse<B = Incoming> {
    pub status: StatusCode,
    /// Reason phrase, when the peer sent a non-canonical one.
    pub reason: Option<String>,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: B,
    /// Whether the transport transparently decoded a content-coding.
    pub uncompressed: bool,
    pub tls: Option<TlsSummary>,
    /// Method of the request this answers; HEAD responses carry no body.
    pub request_method: Method,
}

impl<B> ReceivedResponse<B> {
    /// Build from a response head and body.
    pub fn new(status: StatusCode, version: Version, headers: HeaderMap, body: B) -> Self {
        Self {
            status,
            reason: None,
            version,
            headers,
            body,
            uncompressed: false,
            tls: None,
            request_method: Method::GET,
        }
    }

    /// Split the head from the body stream.
    pub fn into_parts(self) -> (ReceivedResponse<()>, B) {
        let head = ReceivedResponse {
            status: self.status,
            reason: self.reason,
            version: self.version,
            headers: self.headers,
            body: (),
            uncompressed: self.uncompressed,
            tls: self.tls,
            request_method: self.request_method,
        };
        (head, self.body)
    }

    /// `"200 OK"`-style status text.
    pub fn status_text(&self) -> String {
        let reason = self
            .reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or_default();
        format!("{} {}", self.status.as_u16(), reason)
            .trim_end()
            .to_string()
    }

    /// Codings listed in Transfer-Encoding, in order.
    pub fn transfer_encoding(&self) -> Vec<String> {
        self.headers
            .get_all(TRANSFER_ENCODING)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(|c| c.trim().to_ascii_lowercase())
            .filter(|c| !c.is_empty())
            .collect()
    }

    pub fn is_chunked(&self) -> bool {
        self.transfer_encoding()
            .last()
            .is_some_and(|c| c == "chunked")
    }

    /// Whether the framing rules allow a message body at all.
    pub fn may_have_body(&self) -> bool {
        self.request_method != Method::HEAD
            && !self.status.is_informational()
            && self.status != StatusCode::NO_CONTENT
            && self.status != StatusCode::NOT_MODIFIED
    }

    /// Declared Content-Length; unknown for chunked responses.
    pub fn content_length(&self) -> Option<u64> {
        if self.is_chunked() {
            return None;
        }
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Whether the peer will close the connection after this response.
    pub fn close(&self) -> bool {
        let has_token = |token: &str| {
            self.headers
                .get_all(CONNECTION)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(','))
                .any(|t| t.trim().eq_ignore_ascii_case(token))
        };

        if self.version <= Version::HTTP_10 {
            !has_token("keep-alive")
        } else {
            has_token("close")
        }
    }
}
