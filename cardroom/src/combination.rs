//! Vietcong combinations: classification, ranking and the bomb rules.
//!
//! Vietcong orders ranks 3 < 4 < … < K < A < 2 and breaks ties by suit,
//! ♠ < ♣ < ♦ < ♥.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Card, Rank, Suit};

/// The shape of a valid combination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Single,
    Pair,
    Triple,
    Quartet,
    /// Three or more consecutive ranks, 3 up to A.
    Sequence,
    /// Three or more consecutive pairs.
    DoubleSequence,
    /// Two or more consecutive quartets.
    QuartetSequence,
}

/// A classified set of cards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub shape: Shape,
    /// Number of distinct ranks in the combination, e.g. 3 for a run of three
    /// pairs, 1 for a quartet.
    pub chain: u8,
    /// The highest card, which decides comparisons between equal shapes.
    pub top: Card,
}

/// Position of a rank in the Vietcong order, from 3 (lowest) to 15 (the 2).
pub fn rank_value(rank: Rank) -> u8 {
    match rank {
        Rank::Joker => 0,
        Rank::Ace => 14,
        Rank::Two => 15,
        other => other as u8,
    }
}

pub fn suit_value(suit: Suit) -> u8 {
    match suit {
        Suit::Spade => 0,
        Suit::Club => 1,
        Suit::Diamond => 2,
        Suit::Heart => 3,
    }
}

/// Compares two cards in the Vietcong order.
pub fn compare_cards(a: Card, b: Card) -> Ordering {
    (rank_value(a.rank), suit_value(a.suit)).cmp(&(rank_value(b.rank), suit_value(b.suit)))
}

const TWO: u8 = 15;

impl Combination {
    /// Determines the shape of an unordered set of distinct cards.
    ///
    /// Returns `None` if the cards do not form any valid combination.
    pub fn classify(cards: &[Card]) -> Option<Combination> {
        if cards.is_empty() || cards.iter().any(Card::is_joker) {
            return None;
        }
        let mut groups: BTreeMap<u8, u8> = BTreeMap::new();
        for card in cards {
            *groups.entry(rank_value(card.rank)).or_default() += 1;
        }
        let top = cards
            .iter()
            .copied()
            .max_by(|&a, &b| compare_cards(a, b))?;
        let chain = groups.len() as u8;

        let shape = if chain == 1 {
            match cards.len() {
                1 => Shape::Single,
                2 => Shape::Pair,
                3 => Shape::Triple,
                4 => Shape::Quartet,
                _ => return None,
            }
        } else {
            let group_size = *groups.values().next()?;
            if groups.values().any(|&n| n != group_size) || groups.contains_key(&TWO) {
                return None;
            }
            let consecutive = groups
                .keys()
                .zip(groups.keys().skip(1))
                .all(|(&lo, &hi)| hi == lo + 1);
            if !consecutive {
                return None;
            }
            match (group_size, chain) {
                (1, 3..) => Shape::Sequence,
                (2, 3..) => Shape::DoubleSequence,
                (4, 2..) => Shape::QuartetSequence,
                _ => return None,
            }
        };
        Some(Combination { shape, chain, top })
    }

    /// How many 2s this combination consists of, if it is made of 2s only.
    fn twos(&self) -> Option<u8> {
        if rank_value(self.top.rank) != TWO {
            return None;
        }
        match self.shape {
            Shape::Single => Some(1),
            Shape::Pair => Some(2),
            Shape::Triple => Some(3),
            _ => None,
        }
    }

    /// The length of the quartet chain or pair chain, for combinations that
    /// act as bombs.
    fn bomb(&self) -> Option<Bomb> {
        match self.shape {
            Shape::Quartet => Some(Bomb::Quartets(1)),
            Shape::QuartetSequence => Some(Bomb::Quartets(self.chain)),
            Shape::DoubleSequence => Some(Bomb::Pairs(self.chain)),
            _ => None,
        }
    }

    /// Whether this combination may be played on top of `other`.
    pub fn beats(&self, other: &Combination) -> bool {
        if self.shape == other.shape && self.chain == other.chain {
            return compare_cards(self.top, other.top) == Ordering::Greater;
        }
        let Some(bomb) = self.bomb() else {
            return false;
        };
        if let Some(twos) = other.twos() {
            return matches!(
                (twos, bomb),
                (1, Bomb::Quartets(1) | Bomb::Pairs(3))
                    | (2, Bomb::Quartets(2) | Bomb::Pairs(5))
                    | (3, Bomb::Quartets(3) | Bomb::Pairs(7))
            );
        }
        match (bomb, other.bomb()) {
            (Bomb::Quartets(mine), Some(Bomb::Quartets(theirs))) => mine > theirs,
            (Bomb::Pairs(mine), Some(Bomb::Pairs(theirs))) => mine > theirs,
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Bomb {
    Quartets(u8),
    Pairs(u8),
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.shape {
            Shape::Single => write!(f, "single {}", self.top),
            Shape::Pair => write!(f, "pair up to {}", self.top),
            Shape::Triple => write!(f, "triple up to {}", self.top),
            Shape::Quartet => write!(f, "quartet up to {}", self.top),
            Shape::Sequence => write!(f, "sequence of {} up to {}", self.chain, self.top),
            Shape::DoubleSequence => {
                write!(f, "double sequence of {} up to {}", self.chain, self.top)
            }
            Shape::QuartetSequence => {
                write!(f, "quartet sequence of {} up to {}", self.chain, self.top)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::CardHand;
    use crate::card;

    fn combo(codes: &[&str]) -> Option<Combination> {
        let cards: Vec<Card> = codes.iter().map(|c| c.parse().unwrap()).collect();
        Combination::classify(&cards)
    }

    fn shape(codes: &[&str]) -> Option<(Shape, u8)> {
        combo(codes).map(|c| (c.shape, c.chain))
    }

    quickcheck! {
        fn nothing_beats_itself(hand: CardHand) -> bool {
            match Combination::classify(&hand.0) {
                Some(c) => !c.beats(&c),
                None => true,
            }
        }

        fn same_shape_comparison_is_antisymmetric(a: CardHand, b: CardHand) -> bool {
            match (Combination::classify(&a.0), Combination::classify(&b.0)) {
                (Some(x), Some(y)) => !(x.beats(&y) && y.beats(&x)),
                _ => true,
            }
        }
    }

    #[test]
    fn sets_of_equal_rank() {
        assert_eq!(shape(&["9♦"]), Some((Shape::Single, 1)));
        assert_eq!(shape(&["9♦", "9♠"]), Some((Shape::Pair, 1)));
        assert_eq!(shape(&["9♦", "9♠", "9♥"]), Some((Shape::Triple, 1)));
        assert_eq!(shape(&["9♦", "9♠", "9♥", "9♣"]), Some((Shape::Quartet, 1)));
        assert_eq!(shape(&["9♦", "T♠"]), None);
        assert_eq!(shape(&[]), None);
    }

    #[test]
    fn sequences() {
        assert_eq!(shape(&["3♠", "4♦", "5♥"]), Some((Shape::Sequence, 3)));
        assert_eq!(shape(&["Q♠", "K♦", "A♥"]), Some((Shape::Sequence, 3)));
        // No 2s and no wrapping around
        assert_eq!(shape(&["K♠", "A♦", "2♥"]), None);
        assert_eq!(shape(&["A♠", "2♦", "3♥"]), None);
        // Too short or with a gap
        assert_eq!(shape(&["3♠", "4♦"]), None);
        assert_eq!(shape(&["3♠", "4♦", "6♥"]), None);
    }

    #[test]
    fn chained_groups() {
        assert_eq!(
            shape(&["5♠", "5♦", "6♥", "6♣", "7♠", "7♥"]),
            Some((Shape::DoubleSequence, 3))
        );
        assert_eq!(shape(&["5♠", "5♦", "6♥", "6♣"]), None);
        assert_eq!(
            shape(&["5♠", "5♦", "5♥", "5♣", "6♠", "6♦", "6♥", "6♣"]),
            Some((Shape::QuartetSequence, 2))
        );
        // Triples cannot be chained, and group sizes must agree
        assert_eq!(shape(&["5♠", "5♦", "5♥", "6♠", "6♦", "6♥"]), None);
        assert_eq!(shape(&["5♠", "5♦", "6♥", "7♠", "7♦"]), None);
        assert_eq!(shape(&["8♠", "8♦"]), Some((Shape::Pair, 1)));
        assert_eq!(combo(&["JB"]), None);
    }

    #[test]
    fn ranking_uses_rank_then_suit() {
        let three_spades = combo(&["3♠"]).unwrap();
        let three_hearts = combo(&["3♥"]).unwrap();
        let four_spades = combo(&["4♠"]).unwrap();
        let two_spades = combo(&["2♠"]).unwrap();
        let ace_hearts = combo(&["A♥"]).unwrap();
        assert!(three_hearts.beats(&three_spades));
        assert!(four_spades.beats(&three_hearts));
        assert!(two_spades.beats(&ace_hearts));
        assert!(!three_spades.beats(&four_spades));

        let low_pair = combo(&["7♠", "7♥"]).unwrap();
        let high_pair = combo(&["7♣", "7♦"]).unwrap();
        // The top card decides: 7♥ beats 7♦
        assert!(low_pair.beats(&high_pair));
    }

    #[test]
    fn cross_shape_and_cross_length_are_illegal() {
        let pair = combo(&["9♠", "9♥"]).unwrap();
        let single = combo(&["3♠"]).unwrap();
        assert!(!pair.beats(&single));
        let run3 = combo(&["3♠", "4♠", "5♠"]).unwrap();
        let run4 = combo(&["6♠", "7♠", "8♠", "9♠"]).unwrap();
        assert!(!run4.beats(&run3));
    }

    #[test]
    fn bombs_beat_twos() {
        let single_two = combo(&["2♥"]).unwrap();
        let pair_twos = combo(&["2♥", "2♠"]).unwrap();
        let triple_twos = combo(&["2♥", "2♠", "2♦"]).unwrap();
        let quartet = combo(&["3♠", "3♣", "3♦", "3♥"]).unwrap();
        let three_pairs = combo(&["3♠", "3♣", "4♦", "4♥", "5♠", "5♣"]).unwrap();
        let four_pairs = combo(&["3♠", "3♣", "4♦", "4♥", "5♠", "5♣", "6♠", "6♣"]).unwrap();
        let five_pairs = combo(&[
            "3♠", "3♣", "4♦", "4♥", "5♠", "5♣", "6♠", "6♣", "7♠", "7♣",
        ])
        .unwrap();
        let two_quartets =
            combo(&["3♠", "3♣", "3♦", "3♥", "4♠", "4♣", "4♦", "4♥"]).unwrap();

        assert!(quartet.beats(&single_two));
        assert!(three_pairs.beats(&single_two));
        assert!(!four_pairs.beats(&single_two));
        assert!(!quartet.beats(&pair_twos));
        assert!(five_pairs.beats(&pair_twos));
        assert!(two_quartets.beats(&pair_twos));
        assert!(!two_quartets.beats(&triple_twos));
        assert!(!combo(&["A♥"]).unwrap().beats(&single_two));
        assert!(!combo(&["A♥", "A♠"]).unwrap().beats(&single_two));
    }

    #[test]
    fn bombs_lose_only_to_bigger_bombs_of_their_kind() {
        let quartet_threes = combo(&["3♠", "3♣", "3♦", "3♥"]).unwrap();
        let quartet_fours = combo(&["4♠", "4♣", "4♦", "4♥"]).unwrap();
        let two_quartets =
            combo(&["5♠", "5♣", "5♦", "5♥", "6♠", "6♣", "6♦", "6♥"]).unwrap();
        let three_pairs = combo(&["9♠", "9♣", "T♦", "T♥", "J♠", "J♣"]).unwrap();
        let four_pairs = combo(&["3♠", "3♣", "4♦", "4♥", "5♠", "5♣", "6♠", "6♣"]).unwrap();

        assert!(quartet_fours.beats(&quartet_threes));
        assert!(two_quartets.beats(&quartet_fours));
        assert!(!three_pairs.beats(&quartet_threes));
        assert!(!quartet_fours.beats(&three_pairs));
        assert!(four_pairs.beats(&three_pairs));
        assert!(!three_pairs.beats(&four_pairs));
    }

    #[test]
    fn top_card_is_highest_in_vietcong_order() {
        let run = combo(&["J♥", "Q♠", "K♣", "A♠"]).unwrap();
        assert_eq!(run.top, card!("A♠"));
    }
}
