//! HEXDUEL AI - Heuristic planner
//!
//! A priority-pipeline player for the card game: threat assessment around
//! the leader, scored attack/summon/movement candidates, and a fallback
//! chain that always keeps the turn moving. Randomness (per-game
//! aggression, strategy skips, score noise) comes from a seedable RNG so
//! games are reproducible.

pub mod action;
pub mod config;
pub mod driver;
pub mod planner;
pub mod positioning;
pub mod score;
pub mod tactics;
pub mod threat;

#[cfg(test)]
mod testutil;

pub use action::Action;
pub use config::AiConfig;
pub use driver::{auto_setup, play_game, run_game, GameOutcome};
pub use planner::{AiPlayer, Step};
pub use score::{ScoreBreakdown, Weights};
pub use threat::ThreatVector;
