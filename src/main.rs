use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use acm_exporter::aws::AwsBackend;
use acm_exporter::{logging, server, startup, Config};
use anyhow::Context;
use clap::Parser;
use tracing::error;

#[derive(Parser, Debug)]
#[command(version, about = env!("CARGO_PKG_DESCRIPTION"), long_about = None)]
struct Cli {
    /// Path to the configuration YAML file (default: /config/prometheus-acm-exporter.yaml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_example_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.print_example_config {
        print!("{}", Config::example_yaml());
        return ExitCode::SUCCESS;
    }

    logging::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let handle = runtime.handle().clone();

    let exporter = startup::prepare(&config, std::env::var("PORT").ok().as_deref(), || {
        Arc::new(AwsBackend::load(handle))
    })?;

    let addr = exporter.addr;
    runtime
        .block_on(server::serve(addr, exporter.registry))
        .with_context(|| format!("failed to serve on {}", addr))
}
