// sentinela/src/main.rs

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::validate::ValidateArgs;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug sentinela validate ... for the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            input,
            manifest,
            output,
            skip,
            format,
            fail_on_warning,
        } => commands::validate::execute(ValidateArgs {
            input,
            manifest,
            output,
            skip,
            format,
            fail_on_warning,
        }),

        Commands::Init { dir, force } => commands::init::execute(dir, force),
    }
}
