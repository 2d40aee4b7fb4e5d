mod cli;
mod commands;
mod tracing;

use crate::cli::parse;
use crate::tracing::{TracingConfig, init_tracing};
use ::tracing::Instrument;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = parse();

    init_tracing(TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
        ..Default::default()
    })?;

    let span = command_span!(cli.command.name());
    commands::execute(cli).instrument(span).await
}
