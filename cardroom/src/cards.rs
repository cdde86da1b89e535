use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CardsSet;

/// A playing card from a 54-card deck (52 standard cards plus two jokers).
///
/// On the wire a card is `{"rank": 0..13, "suit": 1..4}`. Rank 0 is a joker,
/// with [`Suit::Club`] marking the black joker and [`Suit::Diamond`] the red one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

/// The suit of a [card](Card), serialized as its numeric code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Suit {
    Club = 1,
    Diamond = 2,
    Heart = 3,
    Spade = 4,
}

/// The rank of a [card](Card), serialized as its numeric code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rank {
    Joker = 0,
    Ace = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
}

pub const SUITS: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

/// The thirteen non-joker ranks, in wire order (ace first).
pub const RANKS: [Rank; 13] = [
    Rank::Ace,
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
];

pub const BLACK_JOKER: Card = Card {
    rank: Rank::Joker,
    suit: Suit::Club,
};

pub const RED_JOKER: Card = Card {
    rank: Rank::Joker,
    suit: Suit::Diamond,
};

impl TryFrom<u8> for Suit {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Suit::Club),
            2 => Ok(Suit::Diamond),
            3 => Ok(Suit::Heart),
            4 => Ok(Suit::Spade),
            _ => Err(format!("suit must be between 1 and 4, got {}", value)),
        }
    }
}

impl From<Suit> for u8 {
    fn from(suit: Suit) -> u8 {
        suit as u8
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Rank::Joker),
            1..=13 => Ok(RANKS[value as usize - 1]),
            _ => Err(format!("rank must be between 0 and 13, got {}", value)),
        }
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank as u8
    }
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn is_joker(&self) -> bool {
        self.rank == Rank::Joker
    }

    /// Whether this is a card of the 54-card deck at all.
    ///
    /// Only two jokers exist, so a joker in hearts or spades is not a real card.
    pub fn is_valid(&self) -> bool {
        !self.is_joker() || matches!(self.suit, Suit::Club | Suit::Diamond)
    }

    /// Position of this card in a [`CardsSet`].
    ///
    /// Standard cards occupy 0..52 grouped by suit, the jokers take 52 and 53.
    pub(crate) fn to_index(self) -> u8 {
        if self.is_joker() {
            52 + (self.suit as u8 - 1)
        } else {
            (self.suit as u8 - 1) * 13 + (self.rank as u8 - 1)
        }
    }

    pub(crate) fn from_index(idx: u8) -> Self {
        debug_assert!(idx < 54);
        if idx >= 52 {
            if idx == 52 {
                BLACK_JOKER
            } else {
                RED_JOKER
            }
        } else {
            Card {
                rank: RANKS[(idx % 13) as usize],
                suit: SUITS[(idx / 13) as usize],
            }
        }
    }

    /// Render this card as a Unicode playing cards character
    pub fn unicode_char(&self) -> char {
        // https://en.wikipedia.org/wiki/Playing_Cards_(Unicode_block)
        let codepoint = match (self.rank, self.suit) {
            (Rank::Joker, Suit::Club) => 0x1F0CF,
            (Rank::Joker, _) => 0x1F0BF,
            (rank, suit) => {
                let row = match suit {
                    Suit::Spade => 0,
                    Suit::Heart => 1,
                    Suit::Diamond => 2,
                    Suit::Club => 3,
                };
                // The Unicode block has a knight between jack and queen
                let col = match rank {
                    Rank::Queen | Rank::King => rank as u32 + 1,
                    _ => rank as u32,
                };
                0x1F0A0 + 16 * row + col
            }
        };
        char::from_u32(codepoint).unwrap_or('?')
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.unicode_char())
    }
}

/// The full 52-card deck used by Vietcong.
pub fn standard_deck() -> CardsSet {
    let mut deck = CardsSet::new();
    for suit in SUITS {
        for rank in RANKS {
            deck = deck.insert(Card::new(rank, suit));
        }
    }
    deck
}

/// The 54-card deck used by Fish.
pub fn fish_deck() -> CardsSet {
    standard_deck().insert(BLACK_JOKER).insert(RED_JOKER)
}

/// The error type for the [`FromStr`] instance of [`Card`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardFromStrErr {
    LessThanTwoChars,
    MoreThanTwoChars,
    InvalidRank,
    InvalidSuit,
}

impl std::error::Error for CardFromStrErr {}

impl std::fmt::Display for CardFromStrErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardFromStrErr::LessThanTwoChars => write!(f, "A card code needs two characters"),
            CardFromStrErr::MoreThanTwoChars => write!(f, "A card code has only two characters"),
            CardFromStrErr::InvalidRank => write!(f, "Unknown rank character"),
            CardFromStrErr::InvalidSuit => write!(f, "Unknown suit character"),
        }
    }
}

impl FromStr for Card {
    type Err = CardFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JB" => return Ok(BLACK_JOKER),
            "JR" => return Ok(RED_JOKER),
            _ => {}
        }
        let mut chars = s.chars();
        let rank_char = chars.next().ok_or(CardFromStrErr::LessThanTwoChars)?;
        let suit_char = chars.next().ok_or(CardFromStrErr::LessThanTwoChars)?;
        if chars.next().is_some() {
            return Err(CardFromStrErr::MoreThanTwoChars);
        }
        let rank = match rank_char {
            'A' => Rank::Ace,
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            _ => return Err(CardFromStrErr::InvalidRank),
        };
        let suit = match suit_char {
            '♣' | 'C' => Suit::Club,
            '♦' | 'D' => Suit::Diamond,
            '♥' | 'H' => Suit::Heart,
            '♠' | 'S' => Suit::Spade,
            _ => return Err(CardFromStrErr::InvalidSuit),
        };
        Ok(Card { rank, suit })
    }
}

/// Shorthand for creating cards from a two-character string.
///
/// The first character is the [rank](Rank) (note: 10 is `T`), the second is
/// the [suit](Suit) as a unicode character (♣, ♦, ♥, ♠) or a letter (C, D, H, S).
/// The jokers are `JB` and `JR`.
///
/// This macro is just calling the [`FromStr`] instance of [`Card`].
/// ```
/// # use cardroom::{card, Card, Rank, Suit};
/// assert_eq!(
///     card!("T♥"),
///     Card { rank: Rank::Ten, suit: Suit::Heart }
/// );
/// ```
#[macro_export]
macro_rules! card {
    ($rs:literal) => {
        <$crate::Card as std::str::FromStr>::from_str($rs)
            .expect("Invalid card code given to card! macro")
    };
}
// The import is for using the macro in other modules, see https://stackoverflow.com/a/31749071/1726797
#[allow(unused_imports)]
pub(crate) use card;
