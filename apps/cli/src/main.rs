//! bandsite CLI: turn an exported band chat into a static website.
//!
//! Parses the transcript, extracts structured knowledge chunk by chunk
//! through an LLM, and renders an operational, creative or public site.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
