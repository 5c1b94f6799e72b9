//! dsv-export binary

use anyhow::Context;
use clap::Parser;
use dsv_export::cli::{CliArgs, run};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let default_filter = if args.verbose {
        "dsv_export=debug"
    } else {
        "dsv_export=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&args, &mut out).context("dsv-export failed")?;
    Ok(())
}
