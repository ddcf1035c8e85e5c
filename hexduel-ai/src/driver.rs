//! Self-play driver: automated setup and a full AI-vs-AI game loop

use serde::Serialize;
use tracing::{debug, info, warn};

use hexduel_core::{GameState, Hex, Phase, Player, RuleError};

use crate::config::AiConfig;
use crate::planner::{AiPlayer, Step};
use crate::score::card_value;

/// Hard cap on planner steps for a whole game; a finished game takes far
/// fewer, this only bounds pathological stalls.
const MAX_GAME_STEPS: u32 = 10_000;

/// Result of a completed self-play game
#[derive(Clone, Copy, Debug, Serialize)]
pub struct GameOutcome {
    pub winner: Option<Player>,
    pub turns: u32,
    pub move_count: u32,
    pub captures: [usize; 2],
}

/// Preferred leader square per player: center column on the back row
fn home_hex(player: Player) -> Hex {
    match player {
        Player::One => Hex::new(9, 5),
        Player::Two => Hex::new(1, 5),
    }
}

fn first_empty_near(state: &GameState, anchor: Hex) -> Option<Hex> {
    hexduel_core::board::all_hexes()
        .filter(|h| state.card_at(*h).is_none())
        .min_by_key(|h| (h.distance(anchor), h.row, h.col))
}

/// Run both players' setup placements: leader to the back row first, then
/// the strongest hand cards clustered around it. Placement alternates via
/// the setup rules themselves.
pub fn auto_setup(state: &mut GameState) -> Result<(), RuleError> {
    while state.phase() == Phase::Setup {
        let player = state.current_player();

        if state.find_leader_position(player).is_none() {
            let leader_id = state
                .player(player)
                .hand
                .iter()
                .find(|c| c.is_leader())
                .map(|c| c.id)
                .ok_or(RuleError::CardNotInHand(0))?;
            let hex = first_empty_near(state, home_hex(player))
                .ok_or(RuleError::OccupiedHex)?;
            state.place_card(leader_id, hex)?;
            debug!(?player, ?hex, "setup: leader placed");
            continue;
        }

        let leader_pos = state
            .find_leader_position(player)
            .ok_or(RuleError::CardNotInHand(0))?;
        let card_id = state
            .player(player)
            .hand
            .iter()
            .filter(|c| !c.is_leader())
            .max_by(|a, b| card_value(a).total_cmp(&card_value(b)))
            .map(|c| c.id)
            .ok_or(RuleError::CardNotInHand(0))?;
        let hex = first_empty_near(state, leader_pos).ok_or(RuleError::OccupiedHex)?;
        state.place_card(card_id, hex)?;
        debug!(?player, ?hex, "setup: regular placed");
    }
    Ok(())
}

/// Play one full AI-vs-AI game from a fresh deal
pub fn play_game(seed: u64, config1: AiConfig, config2: AiConfig) -> Result<GameOutcome, RuleError> {
    let mut state = GameState::new(seed);
    auto_setup(&mut state)?;
    let mut players = [AiPlayer::new(config1), AiPlayer::new(config2)];
    run_game(&mut state, &mut players)
}

/// Drive an already set-up game to completion
pub fn run_game(
    state: &mut GameState,
    players: &mut [AiPlayer; 2],
) -> Result<GameOutcome, RuleError> {
    // Players may be reused from an earlier game that ended mid-turn
    for ai in players.iter_mut() {
        ai.reset();
    }

    let mut steps = 0u32;
    while state.phase() == Phase::Play {
        steps += 1;
        if steps > MAX_GAME_STEPS {
            warn!("game step cap hit, declaring a draw");
            break;
        }

        let current = state.current_player();
        let ai = &mut players[current.index()];
        match ai.next_step(state) {
            Step::Act(action) => {
                if let Err(err) = action.apply(state) {
                    // The planner probes actions before proposing them, so
                    // this only fires on a planner/engine disagreement.
                    warn!(?action, %err, "action failed at apply time");
                    state.end_turn();
                }
            }
            Step::EndTurn => state.end_turn(),
        }
    }

    let outcome = GameOutcome {
        winner: state.winner(),
        turns: state.turn(),
        move_count: state.move_count(),
        captures: [
            state.player(Player::One).captured_count(),
            state.player(Player::Two).captured_count(),
        ],
    };
    info!(
        winner = ?outcome.winner,
        turns = outcome.turns,
        captures = ?outcome.captures,
        "game over"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_setup_completes() {
        let mut state = GameState::new(11);
        auto_setup(&mut state).unwrap();

        assert_eq!(state.phase(), Phase::Play);
        for player in [Player::One, Player::Two] {
            let leader = state.find_leader_position(player).unwrap();
            let regulars = state
                .cards_on_board()
                .filter(|(_, c)| c.owner == player && !c.is_leader())
                .count();
            assert_eq!(regulars, 5);
            // The formation clusters around the leader
            assert!(state
                .cards_on_board()
                .filter(|(_, c)| c.owner == player && !c.is_leader())
                .all(|(h, _)| h.distance(leader) <= 2));
        }
    }

    #[test]
    fn test_setup_places_leaders_apart() {
        let mut state = GameState::new(3);
        auto_setup(&mut state).unwrap();

        let one = state.find_leader_position(Player::One).unwrap();
        let two = state.find_leader_position(Player::Two).unwrap();
        assert!(one.distance(two) >= 4);
    }

    #[test]
    fn test_full_game_terminates() {
        let outcome = play_game(
            99,
            AiConfig::deterministic(1),
            AiConfig::deterministic(2),
        )
        .unwrap();

        assert!(outcome.turns > 0);
        if let Some(winner) = outcome.winner {
            // A winner either reached the capture goal or won by the
            // stall rule as the non-aggressor
            let _ = winner;
            assert!(outcome.captures[0] >= 10 || outcome.captures[1] >= 10 || outcome.move_count >= 100);
        }
    }

    #[test]
    fn test_seeded_games_reproduce() {
        let a = play_game(7, AiConfig::deterministic(5), AiConfig::deterministic(6)).unwrap();
        let b = play_game(7, AiConfig::deterministic(5), AiConfig::deterministic(6)).unwrap();
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.move_count, b.move_count);
    }

    #[test]
    fn test_players_survive_reuse_across_games() {
        // A game won on an action leaves the winning player mid-turn;
        // the next run_game must not inherit its loop guard or timer
        let mut players = [
            AiPlayer::new(AiConfig::deterministic(5)),
            AiPlayer::new(AiConfig::deterministic(6)),
        ];

        let mut first = GameState::new(7);
        auto_setup(&mut first).unwrap();
        let a = run_game(&mut first, &mut players).unwrap();

        let mut second = GameState::new(7);
        auto_setup(&mut second).unwrap();
        let b = run_game(&mut second, &mut players).unwrap();

        assert_eq!(a.winner, b.winner);
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.move_count, b.move_count);
    }
}
