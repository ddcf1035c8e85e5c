//! Test fixtures: build arbitrary play-phase states through the snapshot API

use hexduel_core::snapshot::{PlayerSnapshot, Snapshot};
use hexduel_core::state::SetupQuota;
use hexduel_core::{Card, CardId, GameState, Hex, Phase, Player, Suit};

pub(crate) fn card(id: CardId, suit: Suit, rank: u8, owner: Player) -> Card {
    Card::new(id, suit, rank, owner)
}

#[derive(Default)]
pub(crate) struct StateBuilder {
    board: Vec<(Hex, Card)>,
    hands: [Vec<Card>; 2],
    moved: Vec<CardId>,
    attacked: Vec<CardId>,
    current: Option<Player>,
}

impl StateBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, c: Card, hex: Hex) -> Self {
        self.board.push((hex, c));
        self
    }

    pub(crate) fn in_hand(mut self, player: Player, c: Card) -> Self {
        self.hands[player.index()].push(c);
        self
    }

    pub(crate) fn exhausted(mut self, id: CardId) -> Self {
        self.moved.push(id);
        self.attacked.push(id);
        self
    }

    pub(crate) fn moved(mut self, id: CardId) -> Self {
        self.moved.push(id);
        self
    }

    pub(crate) fn attacked(mut self, id: CardId) -> Self {
        self.attacked.push(id);
        self
    }

    pub(crate) fn current(mut self, player: Player) -> Self {
        self.current = Some(player);
        self
    }

    pub(crate) fn build(self) -> GameState {
        let [hand1, hand2] = self.hands;
        Snapshot {
            board: self.board,
            players: [
                PlayerSnapshot {
                    hand: hand1,
                    ..Default::default()
                },
                PlayerSnapshot {
                    hand: hand2,
                    ..Default::default()
                },
            ],
            phase: Phase::Play,
            current_player: self.current.unwrap_or(Player::One),
            first_player: Some(Player::One),
            turn: 1,
            move_count: 1,
            winner: None,
            moved_this_turn: self.moved,
            attacked_this_turn: self.attacked,
            leader_acted_this_turn: false,
            setup_quotas: [SetupQuota {
                leader_placed: true,
                regulars_placed: 5,
            }; 2],
        }
        .restore()
    }
}
