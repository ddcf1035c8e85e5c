//! Positional candidate generators: summons, replacements, formation play,
//! and the always-something fallback chain

use crate::action::Action;
use crate::score::{card_value, flank_bonus, score_move, score_replace, score_summon, Weights};
use crate::threat::{hex_threatened, leader_threats, threatened_after_move};
use hexduel_core::{GameState, Hex, Player, MAX_BOARD_REGULARS};

/// Minimum score for a formation move to be worth an action
const FORMATION_THRESHOLD: f32 = 0.5;

// ============================================================================
// SUMMON / REPLACE
// ============================================================================

fn regulars_on_map(state: &GameState, player: Player) -> usize {
    state
        .cards_on_board()
        .filter(|(_, c)| c.owner == player && !c.is_leader())
        .count()
}

fn leader_action_available(state: &GameState, player: Player) -> bool {
    !state.leader_acted_this_turn() && state.find_leader_position(player).is_some()
}

/// Summon the best hand card into an empty slot next to the leader while
/// the board quota has room
pub fn summon_near_leader(state: &GameState, w: &Weights, player: Player) -> Option<Action> {
    if !leader_action_available(state, player) {
        return None;
    }
    if regulars_on_map(state, player) >= MAX_BOARD_REGULARS {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;

    let mut best: Option<(Action, f32)> = None;
    for card in &state.player(player).hand {
        if card.is_leader() {
            continue;
        }
        for hex in leader_pos.neighbors() {
            if state.card_at(hex).is_some() {
                continue;
            }
            let total = score_summon(state, w, card, hex).total();
            if best.as_ref().map(|(_, t)| total > *t).unwrap_or(true) {
                best = Some((
                    Action::Summon {
                        card_id: card.id,
                        hex,
                    },
                    total,
                ));
            }
        }
    }
    best.map(|(a, _)| a)
}

/// Summon while the quota has room; once the board is full, fall through
/// to a value-upgrading replacement instead
pub fn summon_or_upgrade(state: &GameState, w: &Weights, player: Player) -> Option<Action> {
    summon_near_leader(state, w, player).or_else(|| {
        if regulars_on_map(state, player) >= MAX_BOARD_REGULARS {
            beneficial_replacement(state, w, player)
        } else {
            None
        }
    })
}

/// Upgrade a board card next to the leader when the margin clears the bar
pub fn beneficial_replacement(state: &GameState, w: &Weights, player: Player) -> Option<Action> {
    if !leader_action_available(state, player) {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;
    let under_quota = regulars_on_map(state, player) < MAX_BOARD_REGULARS;

    let mut best: Option<(Action, f32)> = None;
    for hex in leader_pos.neighbors() {
        let Some(occupant) = state.card_at(hex) else {
            continue;
        };
        if occupant.owner != player || occupant.is_leader() {
            continue;
        }
        for card in &state.player(player).hand {
            if card.is_leader() {
                continue;
            }
            let total = score_replace(state, w, hex, card, under_quota).total();
            if total > 0.0 && best.as_ref().map(|(_, t)| total > *t).unwrap_or(true) {
                best = Some((
                    Action::Replace {
                        hex,
                        card_id: card.id,
                    },
                    total,
                ));
            }
        }
    }
    best.map(|(a, _)| a)
}

// ============================================================================
// PROTECTIVE / FORMATION MOVEMENT
// ============================================================================

/// Move a card next to the leader on the side a projected threat will
/// arrive from
pub fn protective_reposition(state: &GameState, _w: &Weights, player: Player) -> Option<Action> {
    let threats = leader_threats(state, player);
    let projected: Vec<_> = threats.iter().filter(|t| !t.immediate).collect();
    if projected.is_empty() {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;

    for threat in projected {
        for (from, card) in state.cards_on_board() {
            if card.owner != player || card.is_leader() {
                continue;
            }
            for to in state.valid_moves(from) {
                if !to.is_adjacent(leader_pos) {
                    continue;
                }
                // Stand between the leader and the incoming threat
                if to.distance(threat.hex) >= leader_pos.distance(threat.hex) {
                    continue;
                }
                if threatened_after_move(state, player, from, to) {
                    continue;
                }
                return Some(Action::Move { from, to });
            }
        }
    }
    None
}

/// Formation play: screen the leader with support cards, flank with
/// diamonds behind the enemy line
pub fn formation_movement(state: &GameState, w: &Weights, player: Player) -> Option<Action> {
    let mut best: Option<(Action, f32)> = None;
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() || state.has_moved(card.id) {
            continue;
        }
        for to in state.valid_moves(from) {
            let mut total = score_move(state, w, from, to).total();
            total += flank_bonus(state, &card, to);
            if total > FORMATION_THRESHOLD
                && best.as_ref().map(|(_, t)| total > *t).unwrap_or(true)
            {
                best = Some((Action::Move { from, to }, total));
            }
        }
    }
    best.map(|(a, _)| a)
}

/// Push the leader forward when it is safe and the position calls for it
pub fn leader_advance(
    state: &GameState,
    _w: &Weights,
    player: Player,
    aggression: f32,
) -> Option<Action> {
    if aggression < 1.0 || !leader_action_available(state, player) {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;
    let enemy_leader = state.find_leader_position(player.opponent())?;
    if !leader_threats(state, player).is_empty() {
        return None;
    }

    state
        .valid_moves(leader_pos)
        .into_iter()
        .filter(|&to| to.distance(enemy_leader) < leader_pos.distance(enemy_leader))
        .find(|&to| !threatened_after_move(state, player, leader_pos, to))
        .map(|to| Action::Move {
            from: leader_pos,
            to,
        })
}

/// Best generic repositioning by heuristic score
pub fn strategic_movement(state: &GameState, w: &Weights, player: Player) -> Option<Action> {
    let mut best: Option<(Action, f32)> = None;
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() || state.has_moved(card.id) {
            continue;
        }
        for to in state.valid_moves(from) {
            let total = score_move(state, w, from, to).total();
            if total > 0.0 && best.as_ref().map(|(_, t)| total > *t).unwrap_or(true) {
                best = Some((Action::Move { from, to }, total));
            }
        }
    }
    best.map(|(a, _)| a)
}

/// Any move that at least does not walk into enemy coverage
pub fn conservative_movement(state: &GameState, _w: &Weights, player: Player) -> Option<Action> {
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() || state.has_moved(card.id) {
            continue;
        }
        for to in state.valid_moves(from) {
            if !threatened_after_move(state, player, from, to) {
                return Some(Action::Move { from, to });
            }
        }
    }
    None
}

// ============================================================================
// FALLBACK CHAIN
// ============================================================================

/// Least selective summon: any regular hand card, any empty slot by the
/// leader
pub fn fallback_summon(state: &GameState, player: Player) -> Option<Action> {
    if !leader_action_available(state, player) {
        return None;
    }
    if regulars_on_map(state, player) >= MAX_BOARD_REGULARS {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;
    let card = state.player(player).hand.iter().find(|c| !c.is_leader())?;
    let action = leader_pos
        .neighbors()
        .find(|h| state.card_at(*h).is_none())
        .map(|hex| Action::Summon {
            card_id: card.id,
            hex,
        });
    action
}

/// Least selective replacement: any strict value improvement
pub fn fallback_replace(state: &GameState, player: Player) -> Option<Action> {
    if !leader_action_available(state, player) {
        return None;
    }
    let leader_pos = state.find_leader_position(player)?;
    for hex in leader_pos.neighbors() {
        let Some(occupant) = state.card_at(hex) else {
            continue;
        };
        if occupant.owner != player || occupant.is_leader() {
            continue;
        }
        for card in &state.player(player).hand {
            if !card.is_leader() && card_value(card) > card_value(occupant) {
                return Some(Action::Replace {
                    hex,
                    card_id: card.id,
                });
            }
        }
    }
    None
}

/// Any safe move at all
pub fn fallback_reposition(state: &GameState, player: Player) -> Option<Action> {
    for (from, card) in state.cards_on_board() {
        if card.owner != player || state.has_moved(card.id) {
            continue;
        }
        for to in state.valid_moves(from) {
            if !hex_threatened(state, player, to, true) {
                return Some(Action::Move { from, to });
            }
        }
    }
    None
}

/// Absolute last resorts: any legal attack, then any legal move of any
/// unmoved card
pub fn any_legal_action(state: &GameState, player: Player) -> Option<Action> {
    for (from, card) in state.cards_on_board() {
        if card.owner != player || card.is_leader() {
            continue;
        }
        if let Some(&to) = state.valid_attacks(from).first() {
            // Skip throwing a card away for nothing
            if let (Some(attacker), Some(defender)) = (state.card_at(from), state.card_at(to)) {
                if attacker.attack() >= defender.defense()
                    || defender.attack() < attacker.defense()
                {
                    return Some(Action::Attack { from, to });
                }
            }
        }
    }
    forced_move(state, player)
}

/// Move any unmoved card anywhere, keeping the turn in motion
pub fn forced_move(state: &GameState, player: Player) -> Option<Action> {
    for (from, card) in state.cards_on_board() {
        if card.owner != player || state.has_moved(card.id) {
            continue;
        }
        if card.is_leader() && state.leader_acted_this_turn() {
            continue;
        }
        if let Some(&to) = state.valid_moves(from).first() {
            return Some(Action::Move { from, to });
        }
    }
    None
}
