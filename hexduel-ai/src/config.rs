//! AI configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning knobs for the heuristic planner
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Random seed (None = seed from entropy)
    pub seed: Option<u64>,
    /// Base aggression multiplier applied to attack scores
    pub base_aggression: f32,
    /// Random extra aggression rolled once per game, in [0, spread)
    pub aggression_spread: f32,
    /// Chance to skip straight to the attack stages for unpredictability
    pub skip_to_attack_chance: f64,
    /// Chance to perturb a candidate's score with bounded noise
    pub noise_chance: f64,
    /// Noise magnitude when it applies
    pub noise_scale: f32,
    /// Hard cap on actions per turn
    pub max_actions_per_turn: u32,
    /// Wall-clock emergency timeout for a single AI turn
    pub turn_time_limit: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            seed: None,
            base_aggression: 1.0,
            aggression_spread: 0.5,
            skip_to_attack_chance: 0.1,
            noise_chance: 0.15,
            noise_scale: 2.0,
            max_actions_per_turn: 30,
            turn_time_limit: Duration::from_secs(30),
        }
    }
}

impl AiConfig {
    /// Config with a fixed seed for reproducible games
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Fully deterministic config: no randomized strategy skips or noise
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            skip_to_attack_chance: 0.0,
            noise_chance: 0.0,
            aggression_spread: 0.0,
            ..Self::default()
        }
    }
}
