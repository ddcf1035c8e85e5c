//! Integration tests for the HEXDUEL stack
//!
//! Tests the full pipeline: engine setup, the AI planner driving whole
//! games, and snapshot persistence in the middle of a game.

use hexduel_ai::{auto_setup, play_game, AiConfig, AiPlayer, Step};
use hexduel_core::{GameState, Phase, Player, Snapshot, Suit};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn set_up_game(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    auto_setup(&mut state).expect("setup should always complete");
    state
}

fn total_cards(state: &GameState, player: Player) -> usize {
    let ps = state.player(player);
    let on_board = state
        .cards_on_board()
        .filter(|(_, c)| c.owner == player)
        .count();
    on_board + ps.hand.len() + ps.deck.len() + ps.discarded.len()
}

// ============================================================================
// FULL GAME FLOW
// ============================================================================

#[test]
fn test_setup_produces_legal_position() {
    let state = set_up_game(42);

    assert_eq!(state.phase(), Phase::Play);
    assert!(state.first_player().is_some());
    for player in [Player::One, Player::Two] {
        assert!(state.find_leader_position(player).is_some());
        assert_eq!(state.player(player).hand.len(), 5);
        assert_eq!(
            state
                .cards_on_board()
                .filter(|(_, c)| c.owner == player)
                .count(),
            6
        );
    }
}

#[test]
fn test_ai_turn_terminates_and_mutates_legally() {
    let mut state = set_up_game(7);
    let mut ai = AiPlayer::new(AiConfig::deterministic(1));

    let mut acted = 0;
    loop {
        match ai.next_step(&state) {
            Step::Act(action) => {
                action.apply(&mut state).expect("planner proposed an illegal action");
                acted += 1;
                assert!(acted <= 31, "AI turn never ended");
            }
            Step::EndTurn => break,
        }
    }
}

#[test]
fn test_full_game_conserves_cards() {
    let mut state = set_up_game(13);
    let mut players = [
        AiPlayer::new(AiConfig::deterministic(3)),
        AiPlayer::new(AiConfig::deterministic(4)),
    ];
    hexduel_ai::run_game(&mut state, &mut players).unwrap();

    // 41 cards per player minus those sitting in the opponent's capture
    // pile as real cards (leader strikes add tokens, not cards)
    for player in [Player::One, Player::Two] {
        let opponent = player.opponent();
        let captured_cards = state
            .player(opponent)
            .captured
            .iter()
            .filter(|t| matches!(t, hexduel_core::Trophy::Card(_)))
            .count();
        assert_eq!(total_cards(&state, player) + captured_cards, 41);
    }
}

#[test]
fn test_leaders_survive_whole_game() {
    let mut state = set_up_game(29);
    let mut players = [
        AiPlayer::new(AiConfig::deterministic(5)),
        AiPlayer::new(AiConfig::deterministic(6)),
    ];
    hexduel_ai::run_game(&mut state, &mut players).unwrap();

    for player in [Player::One, Player::Two] {
        assert!(
            state.find_leader_position(player).is_some(),
            "a leader left the board"
        );
    }
}

#[test]
fn test_winner_reached_capture_goal_or_stall_rule() {
    let outcome = play_game(3, AiConfig::deterministic(8), AiConfig::deterministic(9)).unwrap();

    if let Some(winner) = outcome.winner {
        let winner_captures = outcome.captures[winner.index()];
        assert!(
            winner_captures >= 10 || outcome.move_count >= 100,
            "winner with {} captures after {} moves",
            winner_captures,
            outcome.move_count
        );
    }
}

// ============================================================================
// SNAPSHOT PERSISTENCE MID-GAME
// ============================================================================

#[test]
fn test_snapshot_round_trip_preserves_play() {
    let mut state = set_up_game(17);
    let mut ai = AiPlayer::new(AiConfig::deterministic(2));

    // Advance a few actions into the first turn
    for _ in 0..3 {
        match ai.next_step(&state) {
            Step::Act(action) => action.apply(&mut state).unwrap(),
            Step::EndTurn => break,
        }
    }

    let json = Snapshot::capture(&state).to_json().unwrap();
    let restored = Snapshot::from_json(&json).unwrap().restore();
    assert_eq!(state, restored);

    // The restored state is playable
    let mut ai2 = AiPlayer::new(AiConfig::deterministic(2));
    let mut copy = restored;
    if let Step::Act(action) = ai2.next_step(&copy) {
        action.apply(&mut copy).unwrap();
    }
}

// ============================================================================
// DECK COMPOSITION SANITY
// ============================================================================

#[test]
fn test_each_player_fields_a_full_deck() {
    let state = GameState::new(23);
    for player in [Player::One, Player::Two] {
        let ps = state.player(player);
        let all: Vec<_> = ps.hand.iter().chain(ps.deck.iter()).collect();
        assert_eq!(all.len(), 41);
        assert_eq!(all.iter().filter(|c| c.suit == Suit::Leader).count(), 1);
        for suit in [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades] {
            assert_eq!(all.iter().filter(|c| c.suit == suit).count(), 10);
        }
    }
}
