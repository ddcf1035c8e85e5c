//! Tactical candidate generators: leader protection and attacks

use crate::action::Action;
use crate::score::{score_attack, score_combined_attack, ScoreBreakdown, Weights};
use crate::threat::{
    attack_coverage, hex_threatened, leader_threats, lethal_threats, threatened_after_move,
    ThreatVector,
};
use hexduel_core::{GameState, Hex, Player, MAX_COMBINED_ATTACKERS};
use tracing::debug;

/// Cap on cards considered per combined-attack target
const MAX_COMBINED_POOL: usize = 6;

// ============================================================================
// LEADER PROTECTION
// ============================================================================

/// Highest-priority defense of the leader. Tries, in order: flee,
/// counter-attack, combined counter-attack, interposing a blocker,
/// eliminating a nearby threat, and preempting a projected threat.
pub fn leader_protection(state: &GameState, w: &Weights, player: Player) -> Option<Action> {
    let threats = leader_threats(state, player);
    if threats.is_empty() {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;
    let immediate: Vec<&ThreatVector> = threats.iter().filter(|t| t.immediate).collect();

    if !immediate.is_empty() {
        if let Some(action) = flee(state, player, leader_pos) {
            debug!(?action, "leader protection: flee");
            return Some(action);
        }
        for threat in &immediate {
            if let Some(action) = counter_attack(state, player, threat.hex) {
                debug!(?action, "leader protection: counter-attack");
                return Some(action);
            }
        }
        for threat in &immediate {
            if let Some(action) = combined_counter(state, player, threat.hex) {
                debug!(?action, "leader protection: combined counter");
                return Some(action);
            }
        }
        if let Some(action) = interpose(state, player, leader_pos) {
            debug!(?action, "leader protection: interpose");
            return Some(action);
        }
        for threat in &immediate {
            if let Some(action) = chip_attack(state, w, player, threat.hex) {
                debug!(?action, "leader protection: eliminate threat");
                return Some(action);
            }
        }
    }

    // Projected threats: strike them before they get in range
    for threat in threats.iter().filter(|t| !t.immediate) {
        if let Some(action) = counter_attack(state, player, threat.hex) {
            debug!(?action, "leader protection: preempt");
            return Some(action);
        }
    }
    None
}

/// Move the leader to a hex outside enemy coverage
fn flee(state: &GameState, player: Player, leader_pos: Hex) -> Option<Action> {
    let mut best: Option<(Hex, usize)> = None;
    for to in state.valid_moves(leader_pos) {
        if threatened_after_move(state, player, leader_pos, to) {
            continue;
        }
        // Prefer staying behind friendly cards
        let friends = to
            .neighbors()
            .filter(|n| state.card_at(*n).is_some_and(|c| c.owner == player))
            .count();
        if best.map(|(_, f)| friends > f).unwrap_or(true) {
            best = Some((to, friends));
        }
    }
    best.map(|(to, _)| Action::Move {
        from: leader_pos,
        to,
    })
}

/// A single own card that can destroy the threat outright
fn counter_attack(state: &GameState, player: Player, threat_hex: Hex) -> Option<Action> {
    let threat = state.card_at(threat_hex)?;
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() {
            continue;
        }
        if card.attack() >= threat.defense() && state.valid_attacks(from).contains(&threat_hex) {
            return Some(Action::Attack {
                from,
                to: threat_hex,
            });
        }
    }
    None
}

/// The smallest group of own cards whose pooled attack breaks the threat
fn combined_counter(state: &GameState, player: Player, threat_hex: Hex) -> Option<Action> {
    let threat = state.card_at(threat_hex)?;
    let pool = attacker_pool(state, player, threat_hex);
    smallest_lethal_combo(state, &pool, threat.defense()).map(|attackers| {
        Action::CombinedAttack {
            attackers,
            target: threat_hex,
        }
    })
}

/// Move a card so the leader drops out of every immediate threat's coverage
fn interpose(state: &GameState, player: Player, leader_pos: Hex) -> Option<Action> {
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() {
            continue;
        }
        for to in state.valid_moves(from) {
            if !to.is_adjacent(leader_pos) {
                continue;
            }
            let preview = state.preview_move(from, to);
            let still_exposed = preview.cards_on_board().any(|(hex, c)| {
                c.owner != player
                    && !c.is_leader()
                    && attack_coverage(&preview, hex, &c, false).contains(&leader_pos)
            });
            if !still_exposed {
                return Some(Action::Move { from, to });
            }
        }
    }
    None
}

/// Attack the threat even without a guaranteed kill, if the trade is sane
fn chip_attack(state: &GameState, w: &Weights, player: Player, threat_hex: Hex) -> Option<Action> {
    let mut best: Option<(Action, f32)> = None;
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() {
            continue;
        }
        if !state.valid_attacks(from).contains(&threat_hex) {
            continue;
        }
        let total = score_attack(state, w, from, threat_hex).total();
        if total > -1.0 && best.as_ref().map(|(_, t)| total > *t).unwrap_or(true) {
            best = Some((
                Action::Attack {
                    from,
                    to: threat_hex,
                },
                total,
            ));
        }
    }
    best.map(|(a, _)| a)
}

// ============================================================================
// EMERGENCY DEFENSE
// ============================================================================

/// Relocate a card that would otherwise be destroyed this turn
pub fn emergency_defense(state: &GameState, player: Player) -> Option<Action> {
    for (_, victim_hex) in lethal_threats(state, player) {
        let Some(victim) = state.card_at(victim_hex) else {
            continue;
        };
        if victim.owner != player {
            continue;
        }
        for to in state.valid_moves(victim_hex) {
            if !threatened_after_move(state, player, victim_hex, to) {
                return Some(Action::Move {
                    from: victim_hex,
                    to,
                });
            }
        }
    }
    None
}

// ============================================================================
// ATTACK SELECTION
// ============================================================================

/// Best combined attack: smallest combination per target, best-scoring
/// target overall. Only reported when the pool actually breaks the defense.
pub fn best_combined_attack(
    state: &GameState,
    w: &Weights,
    player: Player,
) -> Option<(Action, ScoreBreakdown)> {
    let mut best: Option<(Action, ScoreBreakdown)> = None;

    for (target, defender) in state.cards_on_board() {
        if defender.owner == player {
            continue;
        }
        let pool = attacker_pool(state, player, target);
        if pool.len() < 2 {
            continue;
        }
        let Some(attackers) = smallest_lethal_combo(state, &pool, defender.defense()) else {
            continue;
        };
        if attackers.len() < 2 {
            // A single card suffices; leave it to the single-attack stage
            continue;
        }
        let score = score_combined_attack(state, w, &attackers, target);
        if score.total() > 0.0
            && best
                .as_ref()
                .map(|(_, s)| score.total() > s.total())
                .unwrap_or(true)
        {
            best = Some((Action::CombinedAttack { attackers, target }, score));
        }
    }
    best
}

/// Best single attack by heuristic score
pub fn best_single_attack(
    state: &GameState,
    w: &Weights,
    player: Player,
) -> Option<(Action, ScoreBreakdown)> {
    let mut best: Option<(Action, ScoreBreakdown)> = None;
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() {
            continue;
        }
        for to in state.valid_attacks(from) {
            let score = score_attack(state, w, from, to);
            if score.total() > 0.0
                && best
                    .as_ref()
                    .map(|(_, s)| score.total() > s.total())
                    .unwrap_or(true)
            {
                best = Some((Action::Attack { from, to }, score));
            }
        }
    }
    best
}

// ============================================================================
// COMBINATION HELPERS
// ============================================================================

/// Own cards able to attack `target` right now, strongest first
fn attacker_pool(state: &GameState, player: Player, target: Hex) -> Vec<Hex> {
    let mut pool: Vec<Hex> = state
        .cards_on_board()
        .filter(|(_, c)| c.owner == player && !c.is_leader())
        .filter(|(hex, _)| state.valid_attacks(*hex).contains(&target))
        .map(|(hex, _)| hex)
        .collect();
    pool.sort_by_key(|&h| {
        std::cmp::Reverse(state.card_at(h).map(|c| c.attack()).unwrap_or(0))
    });
    pool.truncate(MAX_COMBINED_POOL);
    pool
}

/// Try combinations in ascending size until the pooled attack meets the
/// defense. Within a size, the strongest attackers are tried first.
fn smallest_lethal_combo(state: &GameState, pool: &[Hex], defense: u8) -> Option<Vec<Hex>> {
    for size in 1..=MAX_COMBINED_ATTACKERS.min(pool.len()) {
        let mut found = None;
        for_each_combo(pool, size, &mut |combo| {
            if found.is_some() {
                return;
            }
            let total: u16 = combo
                .iter()
                .filter_map(|&h| state.card_at(h))
                .map(|c| c.attack() as u16)
                .sum();
            if total >= defense as u16 {
                found = Some(combo.to_vec());
            }
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Enumerate k-combinations of `items` in order
fn for_each_combo(items: &[Hex], k: usize, f: &mut impl FnMut(&[Hex])) {
    fn rec(items: &[Hex], k: usize, start: usize, acc: &mut Vec<Hex>, f: &mut impl FnMut(&[Hex])) {
        if acc.len() == k {
            f(acc);
            return;
        }
        for i in start..items.len() {
            acc.push(items[i]);
            rec(items, k, i + 1, acc, f);
            acc.pop();
        }
    }
    rec(items, k, 0, &mut Vec::with_capacity(k), f);
}
