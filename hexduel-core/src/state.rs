//! Game state, setup/play/end phase machine, and guarded card removal

use crate::board::Hex;
use crate::cards::{build_deck, Card, CardId, Player};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Hand is refilled up to this many cards at the start of each turn
pub const HAND_SIZE: usize = 5;

/// Regular (non-leader) cards a player may have on the board
pub const MAX_BOARD_REGULARS: usize = 5;

/// Regular cards each player places during setup
pub const SETUP_REGULARS: u8 = 5;

/// Captured entries needed to win
pub const CAPTURES_TO_WIN: usize = 10;

/// Tokens awarded for defeating an enemy leader
pub const LEADER_CAPTURE_TOKENS: usize = 3;

/// Move count at which the aggressor rule can fire
pub const AGGRESSOR_MOVE_LIMIT: u32 = 100;

// ============================================================================
// ERRORS
// ============================================================================

/// A rejected engine command. The state is unchanged whenever one of these
/// is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("hex ({0}, {1}) is not on the board")]
    InvalidHex(i8, i8),
    #[error("hex is already occupied")]
    OccupiedHex,
    #[error("no card at the given hex")]
    EmptyHex,
    #[error("command not legal in phase {0:?}")]
    WrongPhase(Phase),
    #[error("card does not belong to the current player")]
    WrongOwner,
    #[error("card {0} is not in the current player's hand")]
    CardNotInHand(CardId),
    #[error("setup placement quota exceeded")]
    QuotaExceeded,
    #[error("summon target is not adjacent to the leader")]
    NotAdjacentToLeader,
    #[error("the leader has already acted this turn")]
    LeaderAlreadyActed,
    #[error("destination is not a legal move for this card")]
    IllegalMove,
    #[error("target is not a legal attack for this card")]
    IllegalAttack,
    #[error("replacement target must be an own regular card")]
    IllegalReplacement,
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

/// The leader-immortality guard tripped. Raised by the single removal
/// function below; any command that would remove a leader aborts with the
/// state exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("attempted to remove leader card {card_id} from the board")]
pub struct InvariantViolation {
    pub card_id: CardId,
}

// ============================================================================
// CORE TYPES
// ============================================================================

/// Game phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Play,
    End,
}

/// An entry in a player's captured pile: a defeated enemy card, or a
/// placeholder token from defeating the enemy leader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trophy {
    Card(Card),
    LeaderToken,
}

/// Per-player zones
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub hand: Vec<Card>,
    pub deck: Vec<Card>,
    pub captured: Vec<Trophy>,
    pub discarded: Vec<Card>,
    /// Cached leader position; recomputed by board scan when stale
    pub leader_pos: Option<Hex>,
}

impl PlayerState {
    pub fn captured_count(&self) -> usize {
        self.captured.len()
    }
}

/// Setup placement quota tracking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupQuota {
    pub leader_placed: bool,
    pub regulars_placed: u8,
}

impl SetupQuota {
    pub fn complete(&self) -> bool {
        self.leader_placed && self.regulars_placed >= SETUP_REGULARS
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Complete game state (clone to mutate speculatively)
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Board: hex -> card (sparse representation)
    board: FxHashMap<Hex, Card>,
    players: [PlayerState; 2],

    pub(crate) phase: Phase,
    current_player: Player,
    /// Fixed at the setup -> play transition; the aggressor
    first_player: Option<Player>,
    pub(crate) turn: u32,
    pub(crate) move_count: u32,
    winner: Option<Player>,

    /// Per-turn exhaustion bookkeeping, keyed by card id
    moved_this_turn: FxHashSet<CardId>,
    attacked_this_turn: FxHashSet<CardId>,
    leader_acted_this_turn: bool,

    setup_quotas: [SetupQuota; 2],
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create a new game with shuffled decks. The leader goes straight into
    /// each hand; the opening hand is dealt up to [`HAND_SIZE`].
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut next_id: CardId = 0;

        let mut players: [PlayerState; 2] = Default::default();
        for player in [Player::One, Player::Two] {
            let (deck, leader) = build_deck(player, &mut next_id, &mut rng);
            let ps = &mut players[player.index()];
            ps.deck = deck;
            ps.hand.push(leader);
            while ps.hand.len() < HAND_SIZE {
                match ps.deck.pop() {
                    Some(card) => ps.hand.push(card),
                    None => break,
                }
            }
        }

        Self {
            board: FxHashMap::default(),
            players,
            phase: Phase::Setup,
            current_player: Player::One,
            first_player: None,
            turn: 0,
            move_count: 0,
            winner: None,
            moved_this_turn: FxHashSet::default(),
            attacked_this_turn: FxHashSet::default(),
            leader_acted_this_turn: false,
            setup_quotas: [SetupQuota::default(); 2],
        }
    }

    /// Rebuild a state from already-distributed parts (snapshot loading)
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        board: FxHashMap<Hex, Card>,
        players: [PlayerState; 2],
        phase: Phase,
        current_player: Player,
        first_player: Option<Player>,
        turn: u32,
        move_count: u32,
        winner: Option<Player>,
        moved_this_turn: FxHashSet<CardId>,
        attacked_this_turn: FxHashSet<CardId>,
        leader_acted_this_turn: bool,
        setup_quotas: [SetupQuota; 2],
    ) -> Self {
        let mut state = Self {
            board,
            players,
            phase,
            current_player,
            first_player,
            turn,
            move_count,
            winner,
            moved_this_turn,
            attacked_this_turn,
            leader_acted_this_turn,
            setup_quotas,
        };
        // Never trust a cached leader position from outside
        for player in [Player::One, Player::Two] {
            state.players[player.index()].leader_pos = state.scan_leader_position(player);
        }
        state
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn first_player(&self) -> Option<Player> {
        self.first_player
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn player(&self, player: Player) -> &PlayerState {
        &self.players[player.index()]
    }

    pub(crate) fn player_mut(&mut self, player: Player) -> &mut PlayerState {
        &mut self.players[player.index()]
    }

    pub fn card_at(&self, hex: Hex) -> Option<&Card> {
        self.board.get(&hex)
    }

    /// Iterate cards on the board
    pub fn cards_on_board(&self) -> impl Iterator<Item = (Hex, Card)> + '_ {
        self.board.iter().map(|(&hex, &card)| (hex, card))
    }

    pub fn count_cards_on_map(&self, player: Player) -> usize {
        self.board.values().filter(|c| c.owner == player).count()
    }

    fn count_regulars_on_map(&self, player: Player) -> usize {
        self.board
            .values()
            .filter(|c| c.owner == player && !c.is_leader())
            .count()
    }

    /// Cached leader position, falling back to a board scan if stale
    pub fn find_leader_position(&self, player: Player) -> Option<Hex> {
        let cached = self.players[player.index()].leader_pos;
        if let Some(hex) = cached {
            if let Some(card) = self.board.get(&hex) {
                if card.is_leader() && card.owner == player {
                    return Some(hex);
                }
            }
        }
        self.scan_leader_position(player)
    }

    fn scan_leader_position(&self, player: Player) -> Option<Hex> {
        self.board
            .iter()
            .find(|(_, c)| c.is_leader() && c.owner == player)
            .map(|(&hex, _)| hex)
    }

    pub fn setup_quota(&self, player: Player) -> SetupQuota {
        self.setup_quotas[player.index()]
    }

    // ========================================================================
    // EXHAUSTION
    // ========================================================================

    /// A card is exhausted once it has both moved and attacked this turn
    pub fn is_exhausted(&self, id: CardId) -> bool {
        self.moved_this_turn.contains(&id) && self.attacked_this_turn.contains(&id)
    }

    pub fn has_moved(&self, id: CardId) -> bool {
        self.moved_this_turn.contains(&id)
    }

    pub fn has_attacked(&self, id: CardId) -> bool {
        self.attacked_this_turn.contains(&id)
    }

    pub fn leader_acted_this_turn(&self) -> bool {
        self.leader_acted_this_turn
    }

    pub(crate) fn mark_moved(&mut self, id: CardId) {
        self.moved_this_turn.insert(id);
    }

    pub(crate) fn mark_attacked(&mut self, id: CardId) {
        self.attacked_this_turn.insert(id);
    }

    /// Spend both actions at once (combat survivors)
    pub(crate) fn mark_exhausted(&mut self, id: CardId) {
        self.moved_this_turn.insert(id);
        self.attacked_this_turn.insert(id);
    }

    pub(crate) fn mark_leader_acted(&mut self) {
        self.leader_acted_this_turn = true;
    }

    pub(crate) fn exhaustion_sets(&self) -> (&FxHashSet<CardId>, &FxHashSet<CardId>) {
        (&self.moved_this_turn, &self.attacked_this_turn)
    }

    // ========================================================================
    // GUARDED REMOVAL
    // ========================================================================

    /// Remove a card from the board. This is the only removal path, and it
    /// refuses to remove a leader: the attempt is logged and the board is
    /// left untouched.
    pub(crate) fn remove_from_board(&mut self, hex: Hex) -> Result<Card, RuleError> {
        let card = *self.board.get(&hex).ok_or(RuleError::EmptyHex)?;
        if card.is_leader() {
            error!(card_id = card.id, ?hex, "leader removal blocked");
            return Err(InvariantViolation { card_id: card.id }.into());
        }
        self.board.remove(&hex);
        Ok(card)
    }

    /// Destroy the card at `hex` into `captor`'s captured pile
    pub(crate) fn capture_card(&mut self, hex: Hex, captor: Player) -> Result<(), RuleError> {
        let card = self.remove_from_board(hex)?;
        self.players[captor.index()].captured.push(Trophy::Card(card));
        self.check_capture_win(captor);
        Ok(())
    }

    /// Destroy the card at `hex` into its owner's discard pile
    pub(crate) fn discard_card(&mut self, hex: Hex) -> Result<(), RuleError> {
        let card = self.remove_from_board(hex)?;
        self.players[card.owner.index()].discarded.push(card);
        Ok(())
    }

    /// Award leader-capture tokens; the leader itself stays on the board
    pub(crate) fn award_leader_tokens(&mut self, captor: Player) {
        for _ in 0..LEADER_CAPTURE_TOKENS {
            self.players[captor.index()].captured.push(Trophy::LeaderToken);
        }
        self.check_capture_win(captor);
    }

    fn check_capture_win(&mut self, player: Player) {
        if self.phase == Phase::Play
            && self.players[player.index()].captured_count() >= CAPTURES_TO_WIN
        {
            self.phase = Phase::End;
            self.winner = Some(player);
        }
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Place a card from the current player's hand onto the board.
    ///
    /// During setup this consumes quota and auto-advances to the other
    /// player (or into the play phase once both quotas are met). During
    /// play it is a summon: the target must be empty and adjacent to the
    /// owner's leader, and it spends the one leader action of the turn.
    pub fn place_card(&mut self, card_id: CardId, hex: Hex) -> Result<(), RuleError> {
        if !hex.is_valid() {
            return Err(RuleError::InvalidHex(hex.row, hex.col));
        }
        if self.board.contains_key(&hex) {
            return Err(RuleError::OccupiedHex);
        }

        match self.phase {
            Phase::Setup => self.place_card_setup(card_id, hex),
            Phase::Play => self.place_card_play(card_id, hex),
            Phase::End => Err(RuleError::WrongPhase(Phase::End)),
        }
    }

    fn hand_index(&self, card_id: CardId) -> Result<usize, RuleError> {
        self.players[self.current_player.index()]
            .hand
            .iter()
            .position(|c| c.id == card_id)
            .ok_or(RuleError::CardNotInHand(card_id))
    }

    fn place_card_setup(&mut self, card_id: CardId, hex: Hex) -> Result<(), RuleError> {
        let idx = self.hand_index(card_id)?;
        let card = self.players[self.current_player.index()].hand[idx];
        let quota = &self.setup_quotas[self.current_player.index()];

        if card.is_leader() {
            if quota.leader_placed {
                return Err(RuleError::QuotaExceeded);
            }
        } else if quota.regulars_placed >= SETUP_REGULARS {
            return Err(RuleError::QuotaExceeded);
        }

        let player = self.current_player;
        self.players[player.index()].hand.remove(idx);
        self.board.insert(hex, card);

        let quota = &mut self.setup_quotas[player.index()];
        if card.is_leader() {
            quota.leader_placed = true;
            self.players[player.index()].leader_pos = Some(hex);
        } else {
            quota.regulars_placed += 1;
        }

        self.draw_to_hand(player);
        self.advance_setup();
        Ok(())
    }

    fn place_card_play(&mut self, card_id: CardId, hex: Hex) -> Result<(), RuleError> {
        if self.leader_acted_this_turn {
            return Err(RuleError::LeaderAlreadyActed);
        }
        let player = self.current_player;
        let leader_pos = self
            .find_leader_position(player)
            .ok_or(RuleError::NotAdjacentToLeader)?;
        if !leader_pos.is_adjacent(hex) {
            return Err(RuleError::NotAdjacentToLeader);
        }

        let idx = self.hand_index(card_id)?;
        let card = self.players[player.index()].hand[idx];
        if card.is_leader() {
            // The leader is placed during setup only
            return Err(RuleError::QuotaExceeded);
        }
        if self.count_regulars_on_map(player) >= MAX_BOARD_REGULARS {
            return Err(RuleError::QuotaExceeded);
        }

        self.players[player.index()].hand.remove(idx);
        self.board.insert(hex, card);
        self.leader_acted_this_turn = true;
        debug!(card_id, ?hex, "summoned");
        Ok(())
    }

    /// Replace an own regular card on the board with one from hand.
    /// Wrapper over the summon rules; the outgoing card is discarded.
    pub fn replace_card(&mut self, hex: Hex, new_card_id: CardId) -> Result<(), RuleError> {
        if self.phase != Phase::Play {
            return Err(RuleError::WrongPhase(self.phase));
        }
        let occupant = *self.card_at(hex).ok_or(RuleError::EmptyHex)?;
        if occupant.owner != self.current_player || occupant.is_leader() {
            return Err(RuleError::IllegalReplacement);
        }
        if self.leader_acted_this_turn {
            return Err(RuleError::LeaderAlreadyActed);
        }
        let leader_pos = self
            .find_leader_position(self.current_player)
            .ok_or(RuleError::NotAdjacentToLeader)?;
        if !leader_pos.is_adjacent(hex) {
            return Err(RuleError::NotAdjacentToLeader);
        }
        // Validate the incoming card before mutating anything
        let idx = self.hand_index(new_card_id)?;
        let incoming = self.players[self.current_player.index()].hand[idx];
        if incoming.is_leader() {
            return Err(RuleError::IllegalReplacement);
        }

        let player = self.current_player;
        self.discard_card(hex)?;
        self.players[player.index()].hand.remove(idx);
        self.board.insert(hex, incoming);
        self.leader_acted_this_turn = true;
        debug!(outgoing = occupant.id, incoming = incoming.id, ?hex, "replaced");
        Ok(())
    }

    fn advance_setup(&mut self) {
        let both_done = self.setup_quotas.iter().all(SetupQuota::complete);
        if both_done {
            self.begin_play();
        } else {
            // Hand the placement to whichever player still has quota
            let other = self.current_player.opponent();
            if !self.setup_quotas[other.index()].complete() {
                self.current_player = other;
            }
        }
    }

    /// Setup -> play transition. The aggressor (first player) is fixed here
    /// by a deterministic tie-break: fewer board cards, then fewer hand
    /// cards, then player 1.
    fn begin_play(&mut self) {
        let first = self.pick_aggressor();
        self.phase = Phase::Play;
        self.first_player = Some(first);
        self.current_player = first;
        self.start_new_turn();
    }

    fn pick_aggressor(&self) -> Player {
        let board = |p: Player| self.count_cards_on_map(p);
        let hand = |p: Player| self.players[p.index()].hand.len();

        match board(Player::One).cmp(&board(Player::Two)) {
            std::cmp::Ordering::Less => Player::One,
            std::cmp::Ordering::Greater => Player::Two,
            std::cmp::Ordering::Equal => match hand(Player::One).cmp(&hand(Player::Two)) {
                std::cmp::Ordering::Less => Player::One,
                std::cmp::Ordering::Greater => Player::Two,
                std::cmp::Ordering::Equal => Player::One,
            },
        }
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// End the current player's turn and start the opponent's
    pub fn end_turn(&mut self) {
        if self.phase != Phase::Play {
            return;
        }
        self.current_player = self.current_player.opponent();
        self.start_new_turn();
    }

    /// Begin a turn for the current player: clear per-turn bookkeeping,
    /// refill the hand, and bump the counters.
    pub fn start_new_turn(&mut self) {
        if self.phase != Phase::Play {
            return;
        }
        self.moved_this_turn.clear();
        self.attacked_this_turn.clear();
        self.leader_acted_this_turn = false;
        self.draw_to_hand(self.current_player);
        self.turn += 1;
        self.move_count += 1;
        self.check_aggressor_rule();
    }

    fn draw_to_hand(&mut self, player: Player) {
        let ps = &mut self.players[player.index()];
        while ps.hand.len() < HAND_SIZE {
            match ps.deck.pop() {
                Some(card) => ps.hand.push(card),
                None => break,
            }
        }
    }

    /// At move 100 with level capture counts, the aggressor loses outright.
    /// A capture-count lead for either side disarms the rule.
    fn check_aggressor_rule(&mut self) {
        if self.move_count < AGGRESSOR_MOVE_LIMIT || self.phase != Phase::Play {
            return;
        }
        let p1 = self.players[Player::One.index()].captured_count();
        let p2 = self.players[Player::Two.index()].captured_count();
        if p1 == p2 {
            if let Some(aggressor) = self.first_player {
                debug!(?aggressor, move_count = self.move_count, "aggressor rule fired");
                self.phase = Phase::End;
                self.winner = Some(aggressor.opponent());
            }
        }
    }

    // ========================================================================
    // BOARD MUTATION (movement)
    // ========================================================================

    /// Speculative copy with one card relocated, for planners asking
    /// "would this position be threatened". No legality checks, no
    /// exhaustion bookkeeping.
    pub fn preview_move(&self, from: Hex, to: Hex) -> GameState {
        let mut preview = self.clone();
        preview.relocate(from, to);
        preview
    }

    /// Relocate a card without legality checks. Callers validate first.
    pub(crate) fn relocate(&mut self, from: Hex, to: Hex) {
        if let Some(card) = self.board.remove(&from) {
            if card.is_leader() {
                self.players[card.owner.index()].leader_pos = Some(to);
            }
            self.board.insert(to, card);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Empty board, play phase, player one to act
    pub(crate) fn bare_play_state() -> GameState {
        let mut state = GameState::new(0);
        state.phase = Phase::Play;
        state.first_player = Some(Player::One);
        state
    }

    /// Drop a card straight onto the board, bypassing placement rules
    pub(crate) fn put(state: &mut GameState, card: Card, hex: Hex) {
        if card.is_leader() {
            state.players[card.owner.index()].leader_pos = Some(hex);
        }
        state.board.insert(hex, card);
    }

    /// Drive the setup phase to completion with a simple back-row layout
    pub(crate) fn run_setup(state: &mut GameState) {
        // Place each player's leader and five regulars on their back rows
        while state.phase == Phase::Setup {
            let player = state.current_player();
            let quota = state.setup_quota(player);
            let hand = &state.player(player).hand;
            let card_id = if !quota.leader_placed {
                hand.iter().find(|c| c.is_leader()).map(|c| c.id)
            } else {
                hand.iter().find(|c| !c.is_leader()).map(|c| c.id)
            }
            .expect("setup hand should hold a placeable card");

            let hex = crate::board::all_hexes()
                .find(|h| {
                    state.card_at(*h).is_none()
                        && match player {
                            Player::One => h.row <= 2,
                            Player::Two => h.row >= 8,
                        }
                })
                .expect("back rows should have room");
            state.place_card(card_id, hex).expect("setup placement");
        }
    }
}
