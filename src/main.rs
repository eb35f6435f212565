use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tenant_ledger::cli::{init_tracing, Cli};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.run().await
}
