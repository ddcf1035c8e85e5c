//! Actions the AI can issue against the engine

use hexduel_core::{CardId, GameState, Hex, RuleError};

/// One board mutation. The identity of an action doubles as the loop-guard
/// key: issuing the same action twice in a row aborts the AI turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Move { from: Hex, to: Hex },
    Attack { from: Hex, to: Hex },
    CombinedAttack { attackers: Vec<Hex>, target: Hex },
    Summon { card_id: CardId, hex: Hex },
    Replace { hex: Hex, card_id: CardId },
}

impl Action {
    /// Apply this action to the game state
    pub fn apply(&self, state: &mut GameState) -> Result<(), RuleError> {
        match self {
            Action::Move { from, to } => state.move_card(*from, *to),
            Action::Attack { from, to } => state.attack(*from, *to).map(|_| ()),
            Action::CombinedAttack { attackers, target } => state
                .perform_combined_attack(attackers, *target)
                .map(|_| ()),
            Action::Summon { card_id, hex } => state.place_card(*card_id, *hex),
            Action::Replace { hex, card_id } => state.replace_card(*hex, *card_id),
        }
    }
}
