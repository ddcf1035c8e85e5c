//! Match command - a batch of self-play games with aggregate statistics
//!
//! Games run in parallel; each game derives its own deal and AI seeds from
//! the base seed so a match is reproducible as a whole.

use anyhow::Result;
use clap::Args;
use rand::Rng;
use rayon::prelude::*;

use hexduel_ai::{play_game, AiConfig, GameOutcome};
use hexduel_core::Player;

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Disable randomized strategy skips and score noise
    #[arg(long)]
    pub deterministic: bool,

    /// Base aggression for player 1
    #[arg(long, default_value = "1.0")]
    pub aggression1: f32,

    /// Base aggression for player 2
    #[arg(long, default_value = "1.0")]
    pub aggression2: f32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game within the match
#[derive(Clone, Copy, Debug, serde::Serialize)]
struct GameRecord {
    game_number: usize,
    seed: u64,
    outcome: GameOutcome,
}

/// Aggregated match results
#[derive(Clone, Debug, serde::Serialize)]
struct MatchResults {
    games: Vec<GameRecord>,
    player1_wins: usize,
    player2_wins: usize,
    draws: usize,
    avg_turns: f32,
    avg_captures: [f32; 2],
}

pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());

    tracing::info!(games = args.games, base_seed, "starting match");
    let results = play_match(&args, base_seed)?;
    report_results(&results, &args);
    Ok(())
}

fn play_match(args: &MatchArgs, base_seed: u64) -> Result<MatchResults> {
    let games: Result<Vec<GameRecord>> = (0..args.games)
        .into_par_iter()
        .map(|game_num| {
            let game_seed = base_seed.wrapping_add(game_num as u64);
            let (config1, config2) = build_configs(args, game_seed);
            let outcome = play_game(game_seed, config1, config2)?;
            tracing::info!(
                game = game_num + 1,
                winner = ?outcome.winner,
                turns = outcome.turns,
                "game finished"
            );
            Ok(GameRecord {
                game_number: game_num + 1,
                seed: game_seed,
                outcome,
            })
        })
        .collect();

    Ok(compute_statistics(games?))
}

fn build_configs(args: &MatchArgs, game_seed: u64) -> (AiConfig, AiConfig) {
    let base = if args.deterministic {
        AiConfig::deterministic
    } else {
        AiConfig::seeded
    };
    let mut config1 = base(game_seed.wrapping_mul(2).wrapping_add(1));
    let mut config2 = base(game_seed.wrapping_mul(2).wrapping_add(2));
    config1.base_aggression = args.aggression1;
    config2.base_aggression = args.aggression2;
    (config1, config2)
}

fn compute_statistics(games: Vec<GameRecord>) -> MatchResults {
    let total = games.len().max(1) as f32;
    let player1_wins = count_wins(&games, Player::One);
    let player2_wins = count_wins(&games, Player::Two);
    let draws = games.len() - player1_wins - player2_wins;
    let avg_turns = games.iter().map(|g| g.outcome.turns as f32).sum::<f32>() / total;
    let avg_captures = [
        games.iter().map(|g| g.outcome.captures[0] as f32).sum::<f32>() / total,
        games.iter().map(|g| g.outcome.captures[1] as f32).sum::<f32>() / total,
    ];

    MatchResults {
        games,
        player1_wins,
        player2_wins,
        draws,
        avg_turns,
        avg_captures,
    }
}

fn count_wins(games: &[GameRecord], player: Player) -> usize {
    games
        .iter()
        .filter(|g| g.outcome.winner == Some(player))
        .count()
}

fn report_results(results: &MatchResults, args: &MatchArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

fn print_json_results(results: &MatchResults) {
    if let Ok(json) = serde_json::to_string_pretty(results) {
        println!("{}", json);
    }
}

fn print_text_results(results: &MatchResults) {
    println!("Games: {}", results.games.len());
    println!(
        "Player 1: {}  Player 2: {}  Draws: {}",
        results.player1_wins, results.player2_wins, results.draws
    );
    println!(
        "Avg turns: {:.1}  Avg captures: {:.1} - {:.1}",
        results.avg_turns, results.avg_captures[0], results.avg_captures[1]
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_serialize_to_json() {
        let results = compute_statistics(vec![GameRecord {
            game_number: 1,
            seed: 42,
            outcome: GameOutcome {
                winner: Some(Player::One),
                turns: 30,
                move_count: 30,
                captures: [10, 4],
            },
        }]);

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["player1_wins"], 1);
        assert_eq!(value["draws"], 0);
        assert_eq!(value["games"][0]["seed"], 42);
        assert_eq!(value["games"][0]["outcome"]["winner"], "One");
        assert_eq!(value["games"][0]["outcome"]["captures"][0], 10);
    }
}
