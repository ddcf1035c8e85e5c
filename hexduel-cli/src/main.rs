//! HEXDUEL CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single AI-vs-AI game
//! - match: Play a batch of games and report statistics

use clap::{Parser, Subcommand};

mod match_cmd;
mod play_cmd;

#[derive(Parser)]
#[command(name = "hexduel")]
#[command(about = "HEXDUEL card-game engine and self-play driver")]
struct Cli {
    /// Base random seed (deal and AI behavior derive from this)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play a batch of games and report statistics
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
    }
}
