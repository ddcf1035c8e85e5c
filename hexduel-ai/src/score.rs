//! Pure heuristic scoring over an immutable game state
//!
//! Every candidate generator prices its actions here so tests can assert on
//! the breakdown instead of reverse-engineering a single opaque number.

use serde::{Deserialize, Serialize};

use crate::threat::{hex_threatened, threatened_after_move};
use hexduel_core::{Card, GameState, Hex, Player, Suit, LEADER_CAPTURE_TOKENS};

/// Heuristic weights
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Multiplier on the value of a captured card
    pub capture_weight: f32,
    /// Flat bonus for striking the enemy leader
    pub leader_capture_bonus: f32,
    /// Penalty when the acting card would die to counter-damage
    pub counter_penalty: f32,
    /// Penalty for ending in enemy attack coverage
    pub exposure_penalty: f32,
    /// Bonus per follow-up capture enabled by this attack
    pub chain_bonus: f32,
    /// Weight of formation cohesion (screening the leader)
    pub formation_weight: f32,
    /// Weight of forward progress toward the enemy leader
    pub advance_weight: f32,
    /// Minimum value margin for a replacement to count as an upgrade
    pub upgrade_margin: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            capture_weight: 1.0,
            leader_capture_bonus: 12.0,
            counter_penalty: 6.0,
            exposure_penalty: 2.0,
            chain_bonus: 1.5,
            formation_weight: 1.0,
            advance_weight: 0.5,
            upgrade_margin: 2.0,
        }
    }
}

/// Additive score with labeled components
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub capture_value: f32,
    pub leader_bonus: f32,
    pub safety: f32,
    pub formation: f32,
    pub noise: f32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.capture_value + self.leader_bonus + self.safety + self.formation + self.noise
    }
}

/// Heuristic worth of a card: attack plus half its staying power
pub fn card_value(card: &Card) -> f32 {
    card.attack() as f32 + card.defense() as f32 * 0.5
}

// ============================================================================
// ATTACK SCORING
// ============================================================================

/// Score a single attack from `from` against the enemy at `target`
pub fn score_attack(state: &GameState, w: &Weights, from: Hex, target: Hex) -> ScoreBreakdown {
    let (Some(attacker), Some(defender)) = (state.card_at(from), state.card_at(target)) else {
        return ScoreBreakdown::default();
    };

    let mut s = ScoreBreakdown::default();

    if defender.is_leader() {
        s.leader_bonus = w.leader_capture_bonus + LEADER_CAPTURE_TOKENS as f32;
        // No counter-damage from a leader strike
        return s;
    }

    let kills = attacker.attack() >= defender.defense();
    if kills {
        s.capture_value = w.capture_weight * card_value(defender);
        s.capture_value += w.chain_bonus * chain_potential(state, attacker, target);
    } else {
        // Chip attacks only exhaust the defender; worth a sliver
        s.capture_value = 0.5;
    }

    if defender.attack() >= attacker.defense() {
        s.safety -= w.counter_penalty + card_value(attacker) * 0.5;
    } else if kills && hex_threatened(state, attacker.owner, from, true) {
        s.safety -= w.exposure_penalty;
    }

    s
}

/// Score a combined attack; counter-damage is priced per attacker
pub fn score_combined_attack(
    state: &GameState,
    w: &Weights,
    attackers: &[Hex],
    target: Hex,
) -> ScoreBreakdown {
    let Some(defender) = state.card_at(target) else {
        return ScoreBreakdown::default();
    };

    let mut s = ScoreBreakdown::default();

    if defender.is_leader() {
        s.leader_bonus = w.leader_capture_bonus + LEADER_CAPTURE_TOKENS as f32;
        return s;
    }

    let total: u16 = attackers
        .iter()
        .filter_map(|&h| state.card_at(h))
        .map(|c| c.attack() as u16)
        .sum();
    if total >= defender.defense() as u16 {
        s.capture_value = w.capture_weight * card_value(defender);
    }

    for &h in attackers {
        if let Some(attacker) = state.card_at(h) {
            if defender.attack() >= attacker.defense() {
                s.safety -= w.counter_penalty + card_value(attacker) * 0.5;
            }
        }
    }
    // Spending several actions on one target carries opportunity cost
    s.safety -= (attackers.len() as f32 - 1.0) * 0.5;

    s
}

/// Captures this attack could unlock next turn: enemy neighbors of the
/// freed hex that the attacker could then reach and break.
fn chain_potential(state: &GameState, attacker: &Card, target: Hex) -> f32 {
    target
        .neighbors()
        .filter_map(|n| state.card_at(n))
        .filter(|c| {
            c.owner != attacker.owner && !c.is_leader() && attacker.attack() >= c.defense()
        })
        .count() as f32
}

// ============================================================================
// PLACEMENT SCORING
// ============================================================================

/// Score summoning `card` onto `hex`
pub fn score_summon(state: &GameState, w: &Weights, card: &Card, hex: Hex) -> ScoreBreakdown {
    let mut s = ScoreBreakdown {
        capture_value: card_value(card) * 0.5,
        ..Default::default()
    };
    if hex_threatened(state, card.owner, hex, true) {
        s.safety -= w.exposure_penalty;
    }
    s.formation = w.formation_weight * screen_bonus(state, card.owner, hex);
    s
}

/// Score replacing the board card at `hex` with `incoming`.
///
/// One coherent policy: an upgrade must clear the margin, downgrades and
/// same-value swaps score negative, and replacement is heavily discouraged
/// while the board quota is not yet filled.
pub fn score_replace(
    state: &GameState,
    w: &Weights,
    hex: Hex,
    incoming: &Card,
    under_quota: bool,
) -> ScoreBreakdown {
    let Some(outgoing) = state.card_at(hex) else {
        return ScoreBreakdown::default();
    };
    let margin = card_value(incoming) - card_value(outgoing);

    let mut s = ScoreBreakdown::default();
    if margin >= w.upgrade_margin {
        s.capture_value = margin;
    } else {
        s.capture_value = margin - w.upgrade_margin;
    }
    if under_quota {
        // An empty slot is almost always better than a swap
        s.safety -= 10.0;
    }
    s
}

// ============================================================================
// MOVEMENT SCORING
// ============================================================================

/// Score a repositioning move for the card at `from`
pub fn score_move(state: &GameState, w: &Weights, from: Hex, to: Hex) -> ScoreBreakdown {
    let Some(card) = state.card_at(from) else {
        return ScoreBreakdown::default();
    };

    let mut s = ScoreBreakdown::default();

    if threatened_after_move(state, card.owner, from, to) {
        s.safety -= w.exposure_penalty;
    }
    s.formation = w.formation_weight * (screen_bonus_after(state, card, from, to));

    // Forward progress toward the enemy leader
    if let Some(enemy_leader) = state.find_leader_position(card.owner.opponent()) {
        let before = from.distance(enemy_leader) as f32;
        let after = to.distance(enemy_leader) as f32;
        s.capture_value = w.advance_weight * (before - after);
    }

    s
}

/// Cohesion bonus for standing adjacent to the own leader on the enemy side
fn screen_bonus(state: &GameState, owner: Player, hex: Hex) -> f32 {
    let Some(leader) = state.find_leader_position(owner) else {
        return 0.0;
    };
    let mut bonus = match leader.distance(hex) {
        1 => 1.0,
        2 => 0.5,
        _ => 0.0,
    };
    if let Some(enemy_leader) = state.find_leader_position(owner.opponent()) {
        // In front of the leader = between the two leaders
        if hex.distance(enemy_leader) < leader.distance(enemy_leader) {
            bonus += 0.5;
        }
    }
    bonus
}

fn screen_bonus_after(state: &GameState, card: &Card, from: Hex, to: Hex) -> f32 {
    let preview = state.preview_move(from, to);
    screen_bonus(&preview, card.owner, to)
}

/// Diamonds flank: bonus for ending beyond the enemy formation
pub fn flank_bonus(state: &GameState, card: &Card, to: Hex) -> f32 {
    if card.suit != Suit::Diamonds {
        return 0.0;
    }
    let Some(enemy_leader) = state.find_leader_position(card.owner.opponent()) else {
        return 0.0;
    };
    match to.distance(enemy_leader) {
        0..=2 => 1.5,
        3 => 0.5,
        _ => 0.0,
    }
}
