//! Play command - a single AI-vs-AI game with a report at the end

use anyhow::Result;
use clap::Args;
use rand::Rng;

use hexduel_ai::{play_game, AiConfig, GameOutcome};
use hexduel_core::Player;

#[derive(Args)]
pub struct PlayArgs {
    /// Disable randomized strategy skips and score noise
    #[arg(long)]
    pub deterministic: bool,

    /// Base aggression for player 1
    #[arg(long, default_value = "1.0")]
    pub aggression1: f32,

    /// Base aggression for player 2
    #[arg(long, default_value = "1.0")]
    pub aggression2: f32,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let (config1, config2) = build_configs(&args, seed);

    tracing::info!(seed, "starting game");
    let outcome = play_game(seed, config1, config2)?;

    report(&outcome, seed, args.json);
    Ok(())
}

fn build_configs(args: &PlayArgs, seed: u64) -> (AiConfig, AiConfig) {
    let base = if args.deterministic {
        AiConfig::deterministic
    } else {
        AiConfig::seeded
    };
    // Distinct AI seeds derived from the game seed
    let mut config1 = base(seed.wrapping_mul(2).wrapping_add(1));
    let mut config2 = base(seed.wrapping_mul(2).wrapping_add(2));
    config1.base_aggression = args.aggression1;
    config2.base_aggression = args.aggression2;
    (config1, config2)
}

fn report(outcome: &GameOutcome, seed: u64, json: bool) {
    if json {
        #[derive(serde::Serialize)]
        struct GameReport {
            seed: u64,
            outcome: GameOutcome,
        }

        let report = GameReport {
            seed,
            outcome: *outcome,
        };
        if let Ok(json) = serde_json::to_string_pretty(&report) {
            println!("{}", json);
        }
        return;
    }

    match outcome.winner {
        Some(winner) => println!("Winner: {}", player_name(winner)),
        None => println!("Draw"),
    }
    println!(
        "Turns: {}  Captures: {} - {}",
        outcome.turns, outcome.captures[0], outcome.captures[1]
    );
}

fn player_name(player: Player) -> &'static str {
    match player {
        Player::One => "player1",
        Player::Two => "player2",
    }
}
