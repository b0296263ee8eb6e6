use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod fixture;

#[derive(Parser)]
#[command(
    name = "attestline",
    about = "attestline — response framing diagnostics",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded chunk fixture through the demultiplexer.
    ///
    /// Prints the head, body, and trailers a client would have observed.
    /// Exits non-zero if the demultiplexer reported an error.
    Replay {
        /// Path to a TOML chunk fixture
        #[arg(short, long)]
        fixture: PathBuf,
        /// Path to attestline.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Treat a stream without a terminal chunk as an error
        #[arg(long)]
        strict: bool,
        /// Treat a head on any chunk after the first as an error
        #[arg(long)]
        reject_late_head: bool,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the default attestline.toml
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("attestline=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            fixture,
            config,
            strict,
            reject_late_head,
            format,
        } => commands::replay::replay(
            &fixture,
            config.as_deref(),
            strict,
            reject_late_head,
            &format,
        ),
        Commands::Config => commands::config::print_default(),
    }
}
