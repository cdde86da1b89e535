use serde::{Deserialize, Serialize};

use crate::bitset::bitset_traits;
use crate::{Card, CardsSet, Rank, BLACK_JOKER, RANKS, RED_JOKER, SUITS};

/// One of the nine claimable groups of six cards in Fish.
///
/// Half-suits 0..4 are the low cards (2–7) of clubs, diamonds, hearts and
/// spades, 4..8 are the high cards (9–A) in the same suit order, and 8 is
/// the "middles": the four eights and both jokers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HalfSuit(u8);

impl HalfSuit {
    pub const MIDDLES: HalfSuit = HalfSuit(8);

    pub fn new(idx: u8) -> Option<Self> {
        (idx < 9).then_some(HalfSuit(idx))
    }

    pub fn of(card: Card) -> Self {
        if card.is_joker() || card.rank == Rank::Eight {
            return Self::MIDDLES;
        }
        let rank = card.rank as u8;
        let high = rank > 8 || rank == 1;
        HalfSuit(high as u8 * 4 + card.suit as u8 - 1)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = HalfSuit> {
        (0..9).map(HalfSuit)
    }

    /// The six cards belonging to this half-suit.
    pub fn cards(self) -> CardsSet {
        if self == Self::MIDDLES {
            return SUITS
                .iter()
                .map(|&suit| Card::new(Rank::Eight, suit))
                .chain([BLACK_JOKER, RED_JOKER])
                .collect();
        }
        let suit = SUITS[(self.0 % 4) as usize];
        let ranks: &[Rank] = if self.0 < 4 { &RANKS[1..7] } else { &RANKS[8..] };
        ranks
            .iter()
            .chain(if self.0 < 4 { None } else { Some(&Rank::Ace) })
            .map(|&rank| Card::new(rank, suit))
            .collect()
    }
}

impl TryFrom<u8> for HalfSuit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        HalfSuit::new(value)
            .ok_or_else(|| format!("half-suit must be between 0 and 8, got {}", value))
    }
}

impl From<HalfSuit> for u8 {
    fn from(half_suit: HalfSuit) -> u8 {
        half_suit.0
    }
}

impl std::fmt::Display for HalfSuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            "low clubs",
            "low diamonds",
            "low hearts",
            "low spades",
            "high clubs",
            "high diamonds",
            "high hearts",
            "high spades",
            "middles",
        ];
        write!(f, "{}", names[self.0 as usize])
    }
}

/// A set of [`HalfSuit`]s, used to find out which half-suits have been banked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalfSuitSet {
    // Only the low 9 bits are used.
    bits: u16,
}

const VALID_BITS: u16 = 0b1_1111_1111;

bitset_traits!(HalfSuitSet, VALID_BITS);

impl HalfSuitSet {
    pub const ALL: HalfSuitSet = HalfSuitSet { bits: VALID_BITS };

    pub fn new() -> Self {
        Self { bits: 0 }
    }

    /// The half-suits of which at least one card is in `cards`.
    pub fn touched_by(cards: CardsSet) -> Self {
        cards.into_iter().map(HalfSuit::of).collect()
    }

    pub fn len(self) -> u32 {
        self.bits.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn contains(self, half_suit: HalfSuit) -> bool {
        self.bits & (1 << half_suit.0) != 0
    }

    #[must_use]
    pub fn insert(self, half_suit: HalfSuit) -> Self {
        Self {
            bits: self.bits | (1 << half_suit.0),
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::ALL
    }
}

impl FromIterator<HalfSuit> for HalfSuitSet {
    fn from_iter<T: IntoIterator<Item = HalfSuit>>(iter: T) -> Self {
        iter.into_iter()
            .fold(HalfSuitSet::new(), |set, half_suit| set.insert(half_suit))
    }
}
