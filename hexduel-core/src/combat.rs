//! Combat resolution: single and combined attacks, spade absorption

use crate::board::Hex;
use crate::cards::{Card, Suit};
use crate::state::{GameState, Phase, RuleError};
use tracing::debug;

/// Most attackers a combined attack may involve
pub const MAX_COMBINED_ATTACKERS: usize = 4;

/// What an attack did to the board
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackOutcome {
    /// Hex of the card that actually defended (differs from the nominal
    /// target when a spade absorbed the attack)
    pub defender_hex: Hex,
    pub absorbed: bool,
    pub defender_destroyed: bool,
    /// Attackers destroyed by counter-damage
    pub attackers_destroyed: Vec<Hex>,
    /// The defender was a leader: tokens were awarded instead of removal
    pub leader_captured: bool,
}

impl GameState {
    // ========================================================================
    // SINGLE ATTACK
    // ========================================================================

    /// Resolve an attack from the card at `from` against the enemy at `to`.
    ///
    /// Destruction is mutual and independent: the defender falls iff
    /// `attack >= defense`, and the attacker falls to counter-damage iff the
    /// defender's attack meets the attacker's defense. Survivors are
    /// exhausted. Attacking a leader awards capture tokens and never touches
    /// the leader itself.
    pub fn attack(&mut self, from: Hex, to: Hex) -> Result<AttackOutcome, RuleError> {
        if self.phase != Phase::Play {
            return Err(RuleError::WrongPhase(self.phase));
        }
        let attacker = *self.card_at(from).ok_or(RuleError::EmptyHex)?;
        if attacker.owner != self.current_player() {
            return Err(RuleError::WrongOwner);
        }
        if !self.valid_attacks(from).contains(&to) {
            debug!(card_id = attacker.id, ?from, ?to, "rejected attack");
            return Err(RuleError::IllegalAttack);
        }

        let defender_hex = self.absorbing_spade(from, to).unwrap_or(to);
        let absorbed = defender_hex != to;
        let defender = *self.card_at(defender_hex).ok_or(RuleError::EmptyHex)?;

        if defender.is_leader() {
            self.award_leader_tokens(attacker.owner);
            self.mark_exhausted(attacker.id);
            return Ok(AttackOutcome {
                defender_hex,
                absorbed,
                defender_destroyed: false,
                attackers_destroyed: vec![],
                leader_captured: true,
            });
        }

        let defender_destroyed = attacker.attack() >= defender.defense();
        let attacker_destroyed = defender.attack() >= attacker.defense();

        if defender_destroyed {
            self.capture_card(defender_hex, attacker.owner)?;
        } else {
            self.mark_exhausted(defender.id);
        }
        let mut attackers_destroyed = vec![];
        if attacker_destroyed {
            self.discard_card(from)?;
            attackers_destroyed.push(from);
        } else {
            self.mark_exhausted(attacker.id);
        }

        Ok(AttackOutcome {
            defender_hex,
            absorbed,
            defender_destroyed,
            attackers_destroyed,
            leader_captured: false,
        })
    }

    // ========================================================================
    // COMBINED ATTACK
    // ========================================================================

    /// Resolve a combined attack: every attacker must independently have the
    /// target in its valid-attack set. Attack power is summed against the
    /// defense; counter-damage is applied to each attacker individually, so
    /// an attacker can fall even when the group wins.
    pub fn perform_combined_attack(
        &mut self,
        attackers: &[Hex],
        target: Hex,
    ) -> Result<AttackOutcome, RuleError> {
        if self.phase != Phase::Play {
            return Err(RuleError::WrongPhase(self.phase));
        }
        if attackers.is_empty() || attackers.len() > MAX_COMBINED_ATTACKERS {
            return Err(RuleError::IllegalAttack);
        }
        let mut deduped = attackers.to_vec();
        deduped.sort_unstable();
        deduped.dedup();
        if deduped.len() != attackers.len() {
            return Err(RuleError::IllegalAttack);
        }

        let mut cards: Vec<(Hex, Card)> = Vec::with_capacity(attackers.len());
        for &from in attackers {
            let card = *self.card_at(from).ok_or(RuleError::EmptyHex)?;
            if card.owner != self.current_player() {
                return Err(RuleError::WrongOwner);
            }
            if !self.valid_attacks(from).contains(&target) {
                debug!(card_id = card.id, ?from, ?target, "combined attack: illegal member");
                return Err(RuleError::IllegalAttack);
            }
            cards.push((from, card));
        }

        let defender_hex = attackers
            .iter()
            .find_map(|&from| self.absorbing_spade(from, target))
            .unwrap_or(target);
        let absorbed = defender_hex != target;
        let defender = *self.card_at(defender_hex).ok_or(RuleError::EmptyHex)?;

        if defender.is_leader() {
            self.award_leader_tokens(self.current_player());
            for (_, card) in &cards {
                self.mark_exhausted(card.id);
            }
            return Ok(AttackOutcome {
                defender_hex,
                absorbed,
                defender_destroyed: false,
                attackers_destroyed: vec![],
                leader_captured: true,
            });
        }

        let total_attack: u16 = cards.iter().map(|(_, c)| c.attack() as u16).sum();
        let defender_destroyed = total_attack >= defender.defense() as u16;

        if defender_destroyed {
            self.capture_card(defender_hex, self.current_player())?;
        } else {
            self.mark_exhausted(defender.id);
        }

        let mut attackers_destroyed = vec![];
        for (from, card) in &cards {
            if defender.attack() >= card.defense() {
                self.discard_card(*from)?;
                attackers_destroyed.push(*from);
            } else {
                self.mark_exhausted(card.id);
            }
        }

        Ok(AttackOutcome {
            defender_hex,
            absorbed,
            defender_destroyed,
            attackers_destroyed,
            leader_captured: false,
        })
    }

    // ========================================================================
    // SPADE ABSORPTION
    // ========================================================================

    /// Find the defending spade that intercepts an attack on `target`, if
    /// any: the first non-exhausted spade of the defending player adjacent
    /// to the attacker or to a hex along the (approximated) attack path.
    /// Hexes are scanned in board order so the result is deterministic.
    fn absorbing_spade(&self, from: Hex, target: Hex) -> Option<Hex> {
        let defender_owner = self.card_at(target)?.owner;
        if defender_owner == self.current_player() {
            return None;
        }

        // Attacker hex plus intermediates adjacent to both ends; the target
        // itself is not part of the path.
        let mut path = vec![from];
        path.extend(from.neighbors().filter(|h| h.is_adjacent(target) && *h != target));

        let mut spades: Vec<Hex> = self
            .cards_on_board()
            .filter(|(hex, c)| {
                *hex != target
                    && c.owner == defender_owner
                    && c.suit == Suit::Spades
                    && !self.is_exhausted(c.id)
            })
            .map(|(hex, _)| hex)
            .collect();
        spades.sort_unstable();

        spades
            .into_iter()
            .find(|&s| path.iter().any(|&p| s.is_adjacent(p)))
    }
}

// ============================================================================
// TESTS
// ============================================================================
