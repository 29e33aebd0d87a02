//! Stompbox CLI - run the pedal runtime against files on a desktop.

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stompbox")]
#[command(author, version, about = "Stompbox pedal runtime CLI", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an audio file through a configured pedal
    Process(commands::process::ProcessArgs),

    /// List available effects and their parameters
    Effects(commands::effects::EffectsArgs),

    /// Turn tap timestamps into a tempo and delay times
    Tap(commands::tap::TapArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Effects(args) => commands::effects::run(args),
        Commands::Tap(args) => commands::tap::run(args),
    }
}
