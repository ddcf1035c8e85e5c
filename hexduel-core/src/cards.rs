//! Card and deck definitions

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Highest rank in a suit (Ace=1 .. 10)
pub const MAX_RANK: u8 = 10;

/// Cards of each suit per deck
pub const RANKS_PER_SUIT: u8 = 10;

/// Stable card identifier, unique within a game
pub type CardId = u16;

/// Player identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Card suit. Each suit carries its own movement/attack behavior
/// (see the rules module); Leader is the immortal joker suit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
    Leader,
}

impl Suit {
    /// The four regular suits, in deck order
    pub const REGULAR: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

    pub fn is_leader(self) -> bool {
        self == Suit::Leader
    }
}

/// A playing card. Identity and stats are fixed at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: u8,
    pub owner: Player,
}

impl Card {
    pub fn new(id: CardId, suit: Suit, rank: u8, owner: Player) -> Self {
        Self {
            id,
            suit,
            rank,
            owner,
        }
    }

    /// Attack power: the rank (Ace=1)
    pub fn attack(&self) -> u8 {
        self.rank
    }

    /// Defense: rank baseline, doubled for spades, +5 for clubs
    pub fn defense(&self) -> u8 {
        match self.suit {
            Suit::Spades => self.rank * 2,
            Suit::Clubs => self.rank + 5,
            _ => self.rank,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.suit.is_leader()
    }
}

/// Build one player's cards: a shuffled 40-card draw pile and the leader.
///
/// Card ids are allocated from `next_id`, which is advanced past the cards
/// created here so both players get disjoint id ranges.
pub fn build_deck<R: Rng>(owner: Player, next_id: &mut CardId, rng: &mut R) -> (Vec<Card>, Card) {
    let mut deck = Vec::with_capacity(40);
    for suit in Suit::REGULAR {
        for rank in 1..=RANKS_PER_SUIT {
            deck.push(Card::new(*next_id, suit, rank, owner));
            *next_id += 1;
        }
    }
    deck.shuffle(rng);

    let leader = Card::new(*next_id, Suit::Leader, 1, owner);
    *next_id += 1;

    (deck, leader)
}
