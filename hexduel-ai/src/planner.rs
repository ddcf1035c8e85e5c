//! Heuristic planner: a strict priority pipeline over the candidate
//! generators, with per-turn backstops against stalls and runaway turns

use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use hexduel_core::{GameState, Phase, Player};

use crate::action::Action;
use crate::config::AiConfig;
use crate::positioning::{
    any_legal_action, beneficial_replacement, conservative_movement, fallback_replace,
    fallback_reposition, fallback_summon, formation_movement, leader_advance,
    protective_reposition, strategic_movement, summon_or_upgrade,
};
use crate::score::{ScoreBreakdown, Weights};
use crate::tactics::{
    best_combined_attack, best_single_attack, emergency_defense, leader_protection,
};

/// What the planner wants to do next
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Act(Action),
    EndTurn,
}

/// One AI-controlled player. Call [`AiPlayer::next_step`] repeatedly while
/// it is this player's turn; apply each action and feed the updated state
/// back in until it yields [`Step::EndTurn`].
pub struct AiPlayer {
    pub config: AiConfig,
    pub weights: Weights,
    rng: ChaCha8Rng,
    /// base_aggression plus the per-game roll, fixed at construction
    aggression: f32,
    last_action: Option<Action>,
    actions_this_turn: u32,
    turn_started: Option<Instant>,
}

impl AiPlayer {
    pub fn new(config: AiConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let aggression = config.base_aggression + rng.gen::<f32>() * config.aggression_spread;
        Self {
            config,
            weights: Weights::default(),
            rng,
            aggression,
            last_action: None,
            actions_this_turn: 0,
            turn_started: None,
        }
    }

    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    /// Clear per-turn bookkeeping. Needed when a player is reused for a
    /// new game: a game won on an action never reaches the end-of-turn
    /// path, so the turn timer and loop guard would carry over.
    pub fn reset(&mut self) {
        self.last_action = None;
        self.actions_this_turn = 0;
        self.turn_started = None;
    }

    /// Decide the next step of the current turn. Re-entrant: the caller
    /// applies each action itself and calls again with the new state.
    pub fn next_step(&mut self, state: &GameState) -> Step {
        if state.phase() != Phase::Play || state.winner().is_some() {
            return self.finish_turn("game not in play");
        }

        let started = *self.turn_started.get_or_insert_with(Instant::now);
        if started.elapsed() >= self.config.turn_time_limit {
            warn!("turn time limit hit, ending turn");
            return self.finish_turn("time limit");
        }
        if self.actions_this_turn >= self.config.max_actions_per_turn {
            warn!(
                actions = self.actions_this_turn,
                "action cap hit, ending turn"
            );
            return self.finish_turn("action cap");
        }

        let Some(action) = self.decide(state) else {
            return self.finish_turn("no candidate");
        };

        // Proposing the same action twice in a row means the last apply
        // changed nothing we can see; stop rather than loop.
        if self.last_action.as_ref() == Some(&action) {
            warn!(?action, "planner repeated an action, ending turn");
            return self.finish_turn("repeated action");
        }

        // Sanity-check against the rule engine before committing
        let mut probe = state.clone();
        if let Err(err) = action.apply(&mut probe) {
            warn!(?action, %err, "candidate action rejected by rules, ending turn");
            return self.finish_turn("illegal candidate");
        }

        self.last_action = Some(action.clone());
        self.actions_this_turn += 1;
        Step::Act(action)
    }

    fn finish_turn(&mut self, reason: &str) -> Step {
        debug!(reason, actions = self.actions_this_turn, "ending turn");
        self.last_action = None;
        self.actions_this_turn = 0;
        self.turn_started = None;
        Step::EndTurn
    }

    /// The priority pipeline. Stages are tried strictly in order; the
    /// first stage that produces a candidate wins.
    fn decide(&mut self, state: &GameState) -> Option<Action> {
        let player = state.current_player();
        let w = self.weights.clone();

        if let Some(a) = leader_protection(state, &w, player) {
            debug!(?a, "stage: leader protection");
            return Some(a);
        }

        // Occasionally jump straight to the attack stages so the opening
        // is not fully predictable
        if self.config.skip_to_attack_chance > 0.0
            && self.rng.gen_bool(self.config.skip_to_attack_chance)
        {
            if let Some(a) = self.pick_attack(state, &w, player) {
                debug!(?a, "stage: early attack");
                return Some(a);
            }
        }

        if let Some(a) = summon_or_upgrade(state, &w, player) {
            debug!(?a, "stage: summon or upgrade");
            return Some(a);
        }
        if let Some(a) = emergency_defense(state, player) {
            debug!(?a, "stage: emergency defense");
            return Some(a);
        }
        if let Some(a) = protective_reposition(state, &w, player) {
            debug!(?a, "stage: protective reposition");
            return Some(a);
        }
        if let Some(a) = beneficial_replacement(state, &w, player) {
            debug!(?a, "stage: replacement");
            return Some(a);
        }
        if let Some(a) = self.pick_attack(state, &w, player) {
            debug!(?a, "stage: attack");
            return Some(a);
        }
        if let Some(a) = formation_movement(state, &w, player) {
            debug!(?a, "stage: formation");
            return Some(a);
        }
        if let Some(a) = leader_advance(state, &w, player, self.aggression) {
            debug!(?a, "stage: leader advance");
            return Some(a);
        }
        if let Some(a) = strategic_movement(state, &w, player) {
            debug!(?a, "stage: strategic movement");
            return Some(a);
        }
        if let Some(a) = conservative_movement(state, &w, player) {
            debug!(?a, "stage: conservative movement");
            return Some(a);
        }

        // Fallback chain, progressively less selective
        fallback_summon(state, player)
            .or_else(|| fallback_replace(state, player))
            .or_else(|| fallback_reposition(state, player))
            .or_else(|| any_legal_action(state, player))
    }

    /// Combined attacks first, single attacks second, both gated on an
    /// aggression-scaled (and occasionally noised) score staying positive.
    fn pick_attack(&mut self, state: &GameState, w: &Weights, player: Player) -> Option<Action> {
        let candidate = best_combined_attack(state, w, player)
            .or_else(|| best_single_attack(state, w, player));
        let (action, score) = candidate?;
        if self.effective_score(&score) > 0.0 {
            Some(action)
        } else {
            None
        }
    }

    fn effective_score(&mut self, score: &ScoreBreakdown) -> f32 {
        let mut total = score.total() * self.aggression;
        if self.config.noise_chance > 0.0 && self.rng.gen_bool(self.config.noise_chance) {
            total += self.rng.gen_range(-self.config.noise_scale..=self.config.noise_scale);
        }
        total
    }
}
