//! Snapshot serialization for save/restore
//!
//! The wire format is explicit lists rather than maps so that partial or
//! hand-edited files load cleanly: missing exhaustion lists default to
//! empty, and leader positions are always rebuilt by a board scan instead
//! of being trusted from the file.

use crate::board::Hex;
use crate::cards::{Card, CardId, Player};
use crate::state::{GameState, Phase, PlayerState, SetupQuota, Trophy};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Serializable image of one player's zones
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub deck: Vec<Card>,
    #[serde(default)]
    pub captured: Vec<Trophy>,
    #[serde(default)]
    pub discarded: Vec<Card>,
}

/// Serializable image of a full game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Board cells, sorted by hex for a stable file layout
    pub board: Vec<(Hex, Card)>,
    pub players: [PlayerSnapshot; 2],
    pub phase: Phase,
    pub current_player: Player,
    #[serde(default)]
    pub first_player: Option<Player>,
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub move_count: u32,
    #[serde(default)]
    pub winner: Option<Player>,
    #[serde(default)]
    pub moved_this_turn: Vec<CardId>,
    #[serde(default)]
    pub attacked_this_turn: Vec<CardId>,
    #[serde(default)]
    pub leader_acted_this_turn: bool,
    #[serde(default)]
    pub setup_quotas: [SetupQuota; 2],
}

impl Snapshot {
    /// Capture the current state
    pub fn capture(state: &GameState) -> Self {
        let mut board: Vec<(Hex, Card)> = state.cards_on_board().collect();
        board.sort_by_key(|(hex, _)| *hex);

        let snap_player = |p: Player| {
            let ps = state.player(p);
            PlayerSnapshot {
                hand: ps.hand.clone(),
                deck: ps.deck.clone(),
                captured: ps.captured.clone(),
                discarded: ps.discarded.clone(),
            }
        };

        let (moved, attacked) = state.exhaustion_sets();
        let mut moved: Vec<CardId> = moved.iter().copied().collect();
        let mut attacked: Vec<CardId> = attacked.iter().copied().collect();
        moved.sort_unstable();
        attacked.sort_unstable();

        Self {
            board,
            players: [snap_player(Player::One), snap_player(Player::Two)],
            phase: state.phase,
            current_player: state.current_player(),
            first_player: state.first_player(),
            turn: state.turn,
            move_count: state.move_count,
            winner: state.winner(),
            moved_this_turn: moved,
            attacked_this_turn: attacked,
            leader_acted_this_turn: state.leader_acted_this_turn(),
            setup_quotas: [
                state.setup_quota(Player::One),
                state.setup_quota(Player::Two),
            ],
        }
    }

    /// Rebuild a game state. Leader position caches are recomputed from the
    /// board rather than restored.
    pub fn restore(&self) -> GameState {
        let board: FxHashMap<Hex, Card> = self.board.iter().copied().collect();

        let restore_player = |snap: &PlayerSnapshot| PlayerState {
            hand: snap.hand.clone(),
            deck: snap.deck.clone(),
            captured: snap.captured.clone(),
            discarded: snap.discarded.clone(),
            leader_pos: None,
        };

        GameState::from_parts(
            board,
            [
                restore_player(&self.players[0]),
                restore_player(&self.players[1]),
            ],
            self.phase,
            self.current_player,
            self.first_player,
            self.turn,
            self.move_count,
            self.winner,
            self.moved_this_turn.iter().copied().collect::<FxHashSet<_>>(),
            self.attacked_this_turn.iter().copied().collect::<FxHashSet<_>>(),
            self.leader_acted_this_turn,
            self.setup_quotas,
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
