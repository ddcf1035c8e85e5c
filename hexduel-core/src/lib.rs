//! HEXDUEL Core - Game engine
//!
//! This crate provides the core game logic for HEXDUEL:
//! - Board geometry (11x11 offset hex grid)
//! - Cards, suits and deck composition
//! - Per-suit movement/attack rules and club projection
//! - Combat resolution with spade absorption and the leader guard
//! - Turn/phase state machine and snapshot serialization

pub mod board;
pub mod cards;
pub mod combat;
pub mod rules;
pub mod snapshot;
pub mod state;

// Re-exports for convenient access
pub use board::{Hex, BOARD_COLS, BOARD_ROWS};
pub use cards::{Card, CardId, Player, Suit};
pub use combat::{AttackOutcome, MAX_COMBINED_ATTACKERS};
pub use snapshot::Snapshot;
pub use state::{
    GameState, InvariantViolation, Phase, PlayerState, RuleError, Trophy, CAPTURES_TO_WIN,
    HAND_SIZE, LEADER_CAPTURE_TOKENS, MAX_BOARD_REGULARS, SETUP_REGULARS,
};
