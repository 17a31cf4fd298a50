//! Command-line surface.

use clap::Parser;
use std::path::PathBuf;

use crate::config::CraftConfig;
use crate::net::Scheme;
use crate::output::{OutputMode, ProjectionConfig};
use crate::pipeline::RunSettings;
use crate::request::{BodySubstitute, InputSource};

#[derive(Debug, Parser)]
#[command(name = "wirecraft")]
#[command(version, about = "Send a hand-crafted HTTP/1.1 request read from stdin or a file", long_about = None)]
pub struct Cli {
    /// Verbose debug output (resolved request and URL, on stderr)
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Emit the response as JSON
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Populate response TLS information (JSON)
    #[arg(short = 'T', long)]
    pub tls_info: bool,

    /// Omit the body in the response (JSON)
    #[arg(short = 'B', long)]
    pub omit_body: bool,

    /// File to read the request from (if not stdin)
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Substitute request body
    #[arg(short = 'b', long, value_name = "BODY")]
    pub body: Option<String>,

    /// The substitute body is base64-encoded
    #[arg(short = 'd', long)]
    pub base64: bool,

    /// Protocol to use for the request (http or https)
    #[arg(short = 'p', long)]
    pub scheme: Option<Scheme>,

    /// TOML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Substitutions: headers as `name: value`, query parameters as `name? value`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "OVERRIDE")]
    pub overrides: Vec<String>,
}

impl Cli {
    /// Merge flags over the loaded configuration.
    pub fn into_settings(self, config: &CraftConfig) -> RunSettings {
        if self.base64 && self.body.is_none() {
            tracing::warn!("--base64 given without --body; ignoring");
        }

        let json = self.json || config.output.json;
        let projection = ProjectionConfig {
            mode: if json { OutputMode::Structured } else { OutputMode::Wire },
            omit_body: self.omit_body || config.output.omit_body,
            include_tls: self.tls_info || config.output.tls_info,
        };
        if !json && (projection.omit_body || projection.include_tls) {
            tracing::debug!("--omit-body and --tls-info only affect JSON output");
        }

        RunSettings {
            overrides: self.overrides,
            input: InputSource::from_path(self.input),
            scheme: self.scheme.unwrap_or(config.request.scheme),
            body: self.body.map(|text| BodySubstitute::new(text, self.base64)),
            projection,
            ca_file: config.tls.ca_file.clone(),
        }
    }
}
