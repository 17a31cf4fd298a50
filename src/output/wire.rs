//! HTTP/1.x response serialization.

use std::io::{self, Write};

use crate::dispatch::ReceivedResponse;

/// Write status line, headers and body as they would appear on the wire.
///
/// The body has already been de-chunked by the transport; a chunked response
/// is written back as a single chunk so its Transfer-Encoding stays truthful.
/// Responses that cannot carry a body (HEAD, 204, 304) get no chunk framing.
pub fn write_response<W: Write>(
    out: &mut W,
    head: &ReceivedResponse<()>,
    body: &[u8],
) -> io::Result<()> {
    write!(out, "{:?} {}\r\n", head.version, head.status_text())?;

    for (name, value) in &head.headers {
        out.write_all(title_case(name.as_str()).as_bytes())?;
        out.write_all(b": ")?;
        out.write_all(value.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    out.write_all(b"\r\n")?;

    if head.is_chunked() && head.may_have_body() {
        if !body.is_empty() {
            write!(out, "{:x}\r\n", body.len())?;
            out.write_all(body)?;
            out.write_all(b"\r\n")?;
        }
        out.write_all(b"0\r\n\r\n")?;
    } else {
        out.write_all(body)?;
    }
    Ok(())
}

/// `content-type` → `Content-Type`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}
