//! Response projection and rendering.
//!
//! # Responsibilities
//! - Drain or discard the response body exactly once
//! - Build the structured record, honouring omit-body and include-TLS
//! - Render either the wire echo or the JSON record
//!
//! # Design Decisions
//! - Field names are fixed; optional fields are absent rather than null
//! - Body text is UTF-8 with invalid sequences replaced

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Body;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use thiserror::Error;

use crate::dispatch::ReceivedResponse;
use crate::net::TlsSummary;
use crate::output::{wire, OutputMode, ProjectionConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures after the response head arrived.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("could not read response body: {0}")]
    Body(#[source] BoxError),

    #[error("could not encode response to JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Serializable view of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedResponse {
    /// e.g. `"200 OK"`.
    pub status: String,
    pub status_code: u16,
    /// e.g. `"HTTP/1.1"`.
    pub proto: String,
    pub proto_major: u8,
    pub proto_minor: u8,
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub content_length: Option<u64>,
    pub transfer_encoding: Vec<String>,
    pub close: bool,
    pub uncompressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsSummary>,
}

impl ProjectedResponse {
    /// Project the head; body and TLS are filled in by [`project`].
    fn from_head(head: &ReceivedResponse<()>) -> Self {
        let (proto_major, proto_minor) = match head.version {
            http::Version::HTTP_09 => (0, 9),
            http::Version::HTTP_10 => (1, 0),
            http::Version::HTTP_2 => (2, 0),
            http::Version::HTTP_3 => (3, 0),
            _ => (1, 1),
        };

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in &head.headers {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            status: head.status_text(),
            status_code: head.status.as_u16(),
            proto: format!("{:?}", head.version),
            proto_major,
            proto_minor,
            headers,
            body: None,
            content_length: head.content_length(),
            transfer_encoding: head.transfer_encoding(),
            close: head.close(),
            uncompressed: head.uncompressed,
            tls: None,
        }
    }
}

/// Read the whole body stream.
async fn drain<B>(body: B) -> Result<Bytes, ProjectError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let collected = body
        .collect()
        .await
        .map_err(|e| ProjectError::Body(e.into()))?;
    Ok(collected.to_bytes())
}

/// Build the structured record.
pub async fn project<B>(
    response: ReceivedResponse<B>,
    config: &ProjectionConfig,
) -> Result<ProjectedResponse, ProjectError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (head, body) = response.into_parts();
    let mut projected = ProjectedResponse::from_head(&head);

    if config.omit_body {
        // Dropping the stream releases the connection.
        drop(body);
        tracing::debug!("Response body discarded");
    } else {
        let bytes = drain(body).await?;
        tracing::debug!(bytes = bytes.len(), "Response body read");
        projected.body = Some(String::from_utf8_lossy(&bytes).into_owned());
    }

    if config.include_tls {
        projected.tls = head.tls;
    }

    Ok(projected)
}

/// Write the response to `out` in the configured mode.
pub async fn render<B, W>(
    response: ReceivedResponse<B>,
    config: &ProjectionConfig,
    out: &mut W,
) -> Result<(), ProjectError>
where
    B: Body,
    B::Error: Into<BoxError>,
    W: Write,
{
    match config.mode {
        OutputMode::Wire => {
            let (head, body) = response.into_parts();
            let bytes = drain(body).await?;
            wire::write_response(out, &head, &bytes)?;
        }
        OutputMode::Structured => {
            let projected = project(response, config).await?;
            serde_json::to_writer(&mut *out, &projected)?;
        }
    }
    out.write_all(b"\n")?;
    Ok(())
}
