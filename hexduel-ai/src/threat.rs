//! Threat assessment over an immutable board snapshot

use hexduel_core::{Card, GameState, Hex, Player, Suit};
use rustc_hash::FxHashSet;

/// Enemy cards further than this from the leader are ignored by the scan
pub const THREAT_SCAN_RADIUS: i8 = 5;

/// An enemy card that endangers the leader
#[derive(Clone, Copy, Debug)]
pub struct ThreatVector {
    /// Where the threatening card sits
    pub hex: Hex,
    pub card: Card,
    /// Can attack the leader this turn without moving first
    pub immediate: bool,
    /// Approximate distance to the leader
    pub distance: i8,
}

/// Hexes a card can move across in one turn
fn move_range(card: &Card) -> i8 {
    match card.suit {
        Suit::Diamonds => 2,
        _ => 1,
    }
}

/// Hexes a card can attack across
fn attack_range(card: &Card) -> i8 {
    match card.suit {
        Suit::Hearts => 2,
        Suit::Leader => 0,
        _ => 1,
    }
}

/// Full threat-vector scan for `player`'s leader: enemy cards within the
/// scan radius that could hit a leader attack square this turn or the next.
pub fn leader_threats(state: &GameState, player: Player) -> Vec<ThreatVector> {
    let Some(leader_pos) = state.find_leader_position(player) else {
        return vec![];
    };

    let mut threats = Vec::new();
    for (hex, card) in state.cards_on_board() {
        if card.owner == player || card.is_leader() {
            continue;
        }
        let distance = hex.distance(leader_pos);
        if distance > THREAT_SCAN_RADIUS {
            continue;
        }
        let immediate = attack_coverage(state, hex, &card, false).contains(&leader_pos);
        let reach = move_range(&card) + attack_range(&card);
        if immediate || distance <= reach {
            threats.push(ThreatVector {
                hex,
                card,
                immediate,
                distance,
            });
        }
    }
    // Most pressing first
    threats.sort_by_key(|t| (!t.immediate, t.distance, std::cmp::Reverse(t.card.attack())));
    threats
}

/// Hexes a card could attack, whether or not a target currently stands
/// there. With `next_turn` set, exhaustion this turn is ignored.
pub fn attack_coverage(state: &GameState, from: Hex, card: &Card, next_turn: bool) -> Vec<Hex> {
    if card.is_leader() {
        return vec![];
    }
    if !next_turn && state.has_attacked(card.id) {
        return vec![];
    }

    match card.suit {
        Suit::Hearts => hearts_coverage(state, from, card),
        _ => from.neighbors().collect(),
    }
}

/// Hearts coverage mirrors the rule engine's depth-2 search: empty and
/// allied hexes extend, enemy hexes terminate their branch but are covered.
fn hearts_coverage(state: &GameState, from: Hex, card: &Card) -> Vec<Hex> {
    let mut covered = Vec::new();
    let mut seen = FxHashSet::default();
    seen.insert(from);

    let mut frontier = vec![from];
    for _ in 0..2 {
        let mut next = Vec::new();
        for hex in frontier {
            for n in hex.neighbors() {
                if !seen.insert(n) {
                    continue;
                }
                covered.push(n);
                match state.card_at(n) {
                    Some(c) if c.owner != card.owner => {}
                    _ => next.push(n),
                }
            }
        }
        frontier = next;
    }
    covered
}

/// Is `hex` inside any enemy card's attack coverage?
pub fn hex_threatened(state: &GameState, defender: Player, hex: Hex, next_turn: bool) -> bool {
    state.cards_on_board().any(|(from, card)| {
        card.owner != defender && attack_coverage(state, from, &card, next_turn).contains(&hex)
    })
}

/// Would the card at `from` stand in enemy coverage after moving to `to`?
pub fn threatened_after_move(state: &GameState, defender: Player, from: Hex, to: Hex) -> bool {
    let preview = state.preview_move(from, to);
    hex_threatened(&preview, defender, to, true)
}

/// Enemy cards that can destroy one of `player`'s cards right now.
/// Returns (attacker hex, victim hex) pairs.
pub fn lethal_threats(state: &GameState, player: Player) -> Vec<(Hex, Hex)> {
    let mut out = Vec::new();
    for (from, card) in state.cards_on_board() {
        if card.owner == player {
            continue;
        }
        for target in state.valid_attacks(from) {
            let Some(victim) = state.card_at(target) else {
                continue;
            };
            if victim.owner == player
                && !victim.is_leader()
                && card.attack() >= victim.defense()
            {
                out.push((from, target));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{card, StateBuilder};

    #[test]
    fn test_immediate_leader_threat() {
        let state = StateBuilder::new()
            .with(card(1000, Suit::Leader, 1, Player::One), Hex::new(5, 5))
            .with(card(1001, Suit::Clubs, 3, Player::Two), Hex::new(5, 6))
            .build();

        let threats = leader_threats(&state, Player::One);
        assert_eq!(threats.len(), 1);
        assert!(threats[0].immediate);
        assert_eq!(threats[0].hex, Hex::new(5, 6));
    }

    #[test]
    fn test_projected_threat_within_reach() {
        // Diamond two hexes out: reach = move 2 + attack 1
        let state = StateBuilder::new()
            .with(card(1000, Suit::Leader, 1, Player::One), Hex::new(5, 5))
            .with(card(1001, Suit::Diamonds, 3, Player::Two), Hex::new(5, 8))
            .build();

        let threats = leader_threats(&state, Player::One);
        assert_eq!(threats.len(), 1);
        assert!(!threats[0].immediate);
    }

    #[test]
    fn test_distant_card_ignored() {
        let state = StateBuilder::new()
            .with(card(1000, Suit::Leader, 1, Player::One), Hex::new(5, 2))
            .with(card(1001, Suit::Clubs, 3, Player::Two), Hex::new(5, 10))
            .build();

        assert!(leader_threats(&state, Player::One).is_empty());
    }

    #[test]
    fn test_hearts_coverage_includes_ranged_square() {
        let hearts = card(1001, Suit::Hearts, 3, Player::Two);
        let state = StateBuilder::new().with(hearts, Hex::new(5, 7)).build();

        let coverage = attack_coverage(&state, Hex::new(5, 7), &hearts, false);
        assert!(coverage.contains(&Hex::new(5, 5)));
        assert!(coverage.contains(&Hex::new(5, 6)));
    }

    #[test]
    fn test_hex_threatened() {
        let state = StateBuilder::new()
            .with(card(1001, Suit::Spades, 3, Player::Two), Hex::new(5, 6))
            .build();

        assert!(hex_threatened(&state, Player::One, Hex::new(5, 5), false));
        assert!(!hex_threatened(&state, Player::One, Hex::new(5, 1), false));
    }

    #[test]
    fn test_spent_attacker_only_threatens_next_turn() {
        let state = StateBuilder::new()
            .with(card(1001, Suit::Spades, 3, Player::Two), Hex::new(5, 6))
            .attacked(1001)
            .build();

        assert!(!hex_threatened(&state, Player::One, Hex::new(5, 5), false));
        assert!(hex_threatened(&state, Player::One, Hex::new(5, 5), true));
    }

    #[test]
    fn test_lethal_threats() {
        let state = StateBuilder::new()
            .with(card(1000, Suit::Hearts, 2, Player::One), Hex::new(5, 5)) // defense 2
            .with(card(1001, Suit::Clubs, 4, Player::Two), Hex::new(5, 6)) // attack 4
            .build();

        let lethal = lethal_threats(&state, Player::One);
        assert_eq!(lethal, vec![(Hex::new(5, 6), Hex::new(5, 5))]);
    }

    #[test]
    fn test_threatened_after_move() {
        let state = StateBuilder::new()
            .with(card(1000, Suit::Hearts, 2, Player::One), Hex::new(5, 2))
            .with(card(1001, Suit::Clubs, 4, Player::Two), Hex::new(5, 6))
            .build();

        assert!(threatened_after_move(&state, Player::One, Hex::new(5, 2), Hex::new(5, 5)));
        assert!(!threatened_after_move(&state, Player::One, Hex::new(5, 2), Hex::new(5, 1)));
    }
}
