//! The single-shot run: parse → materialize → dispatch → project → write.
//!
//! Every stage owns its value until it hands it to the next; nothing runs
//! concurrently and the first error ends the run.

use std::io::Write;
use std::path::PathBuf;

use crate::dispatch::{DispatchOptions, Dispatcher};
use crate::error::{CraftError, CraftResult};
use crate::net::{build_client_config, Scheme};
use crate::output::{render, ProjectionConfig};
use crate::overrides::OverrideSet;
use crate::request::{materialize, parse_request, BodySubstitute, InputSource};

/// Everything one run needs, after config and flags are merged.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Raw override arguments, in command-line order.
    pub overrides: Vec<String>,
    pub input: InputSource,
    pub scheme: Scheme,
    pub body: Option<BodySubstitute>,
    pub projection: ProjectionConfig,
    /// Extra trusted roots for https.
    pub ca_file: Option<PathBuf>,
}

/// Execute one request and write the rendered response to `out`.
pub async fn execute<W: Write>(settings: RunSettings, out: &mut W) -> CraftResult<()> {
    // Fail on bad overrides before blocking on input.
    let overrides = OverrideSet::from_args(&settings.overrides)?;
    tracing::debug!(
        headers = overrides.headers().len(),
        queries = overrides.queries().len(),
        "Overrides parsed"
    );

    let source_name = settings.input.describe();
    let input = settings
        .input
        .read_all()
        .map_err(|source| CraftError::Input {
            source_name: source_name.clone(),
            source,
        })?;
    tracing::debug!(source = %source_name, bytes = input.len(), "Request read");

    let raw = parse_request(&input)?;
    let resolved = materialize(raw, &overrides, settings.scheme, settings.body.as_ref())?;

    let tls_config = build_client_config(settings.ca_file.as_deref()).map_err(CraftError::Tls)?;
    let dispatcher = Dispatcher::new(
        tls_config,
        DispatchOptions {
            capture_tls: settings.projection.include_tls,
        },
    );
    let response = dispatcher.send(resolved).await?;

    render(response, &settings.projection, out).await?;
    Ok(())
}
