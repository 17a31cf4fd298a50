use clap::Parser;
use std::io::{BufWriter, Write};

use wirecraft::cli::Cli;
use wirecraft::config::load_config;
use wirecraft::observability::init_logging;
use wirecraft::output::ProjectError;
use wirecraft::{execute, CraftConfig, CraftError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("err: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CraftError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => CraftConfig::default(),
    };

    if let Err(e) = init_logging(&config.logging, cli.debug) {
        eprintln!("warning: logging unavailable: {e}");
    }

    tracing::debug!(
        config = ?cli.config,
        scheme = ?cli.scheme,
        overrides = cli.overrides.len(),
        "wirecraft v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let settings = cli.into_settings(&config);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    execute(settings, &mut out).await?;
    out.flush().map_err(ProjectError::from)?;
    Ok(())
}
