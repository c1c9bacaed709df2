use std::process::ExitCode;

use clap::Parser;
use hibp_check::{Cli, RenderConfig, run};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    // RUST_LOG overrides the default; logs go to stderr so stdout only carries results
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let render = RenderConfig::new(cli.color, cli.format);

    match run(&cli, &render, &mut std::io::stdout().lock()).await {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("{}", render.failure(&format!("Error: {e}")));
            ExitCode::FAILURE
        }
    }
}
