use std::collections::BTreeSet;

use crate::{Card, Rank, Suit, RANKS, SUITS};

/// A handful of distinct, non-joker cards.
///
/// Cards are drawn from only a few neighbouring ranks so that pairs,
/// sequences and bombs show up often.
#[derive(Clone, Debug)]
pub struct CardHand(pub Vec<Card>);

impl quickcheck::Arbitrary for CardHand {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let lowest = u8::arbitrary(g) % 13;
        let width = u8::arbitrary(g) % 4 + 1;
        let len = usize::arbitrary(g) % 8 + 1;
        let mut cards = BTreeSet::new();
        for _ in 0..len {
            let rank = RANKS[((lowest + u8::arbitrary(g) % width) % 13) as usize];
            cards.insert(Card::new(rank, Suit::arbitrary(g)));
        }
        CardHand(cards.into_iter().collect())
    }
}

impl quickcheck::Arbitrary for Suit {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&SUITS).unwrap()
    }
}

impl quickcheck::Arbitrary for Rank {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&RANKS).unwrap()
    }
}

impl quickcheck::Arbitrary for Card {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        // One in 27 cards is a joker, as in a full deck
        if u8::arbitrary(g) % 27 == 0 {
            let suit = *g.choose(&[Suit::Club, Suit::Diamond]).unwrap();
            return Card::new(Rank::Joker, suit);
        }
        Self {
            rank: Rank::arbitrary(g),
            suit: Suit::arbitrary(g),
        }
    }
}
