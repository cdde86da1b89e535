use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::{
    Card, CardsSet, Fish, GameKind, GameState, Malformed, OwnerRef, PlayerId, SetupError, Turn,
    TurnError, Vietcong,
};

/// The rules of one game: how to deal it and how turns change its state.
///
/// A session picks its engine once, when it is created.
pub trait RuleEngine: Send + Sync {
    fn kind(&self) -> GameKind;

    /// Every card in play; the owners of a game always partition this set.
    fn deck(&self) -> CardsSet;

    /// Shuffles the deck and deals it to `players`, seated in the given order.
    fn deal(&self, players: &[PlayerId], rng: &mut StdRng) -> Result<GameState, SetupError>;

    /// Checks whether `turn` may be applied to `state`.
    fn validate(&self, state: &GameState, turn: &Turn) -> Result<(), TurnError>;

    /// Applies a turn that passed [`validate`](RuleEngine::validate).
    fn apply(&self, state: GameState, turn: &Turn) -> GameState;

    /// Validates and applies a turn, leaving `state` untouched on error.
    fn play(&self, state: &GameState, turn: &Turn) -> Result<GameState, TurnError> {
        self.validate(state, turn)?;
        Ok(self.apply(state.clone(), turn))
    }
}

impl GameKind {
    pub fn engine(self) -> Box<dyn RuleEngine> {
        match self {
            GameKind::Vietcong => Box::new(Vietcong),
            GameKind::Fish => Box::new(Fish),
        }
    }
}

/// Checks the seating list against the player counts a game allows.
pub(crate) fn check_players(
    players: &[PlayerId],
    allowed: &'static str,
    count_ok: impl Fn(usize) -> bool,
) -> Result<(), SetupError> {
    if !count_ok(players.len()) {
        return Err(SetupError::WrongPlayerCount {
            allowed,
            got: players.len(),
        });
    }
    let mut seen = BTreeSet::new();
    for id in players {
        if OwnerRef::is_reserved_id(id) {
            return Err(SetupError::ReservedPlayerId(id.clone()));
        }
        if !seen.insert(id) {
            return Err(SetupError::DuplicatePlayer(id.clone()));
        }
    }
    Ok(())
}

/// Shuffles `deck` and deals it one card at a time around the table.
pub(crate) fn deal_round_robin(
    deck: CardsSet,
    players: &[PlayerId],
    rng: &mut StdRng,
) -> Vec<(PlayerId, CardsSet)> {
    let mut cards: Vec<Card> = deck.into_iter().collect();
    cards.shuffle(rng);
    let mut hands: Vec<(PlayerId, CardsSet)> = players
        .iter()
        .map(|id| (id.clone(), CardsSet::new()))
        .collect();
    for (i, card) in cards.into_iter().enumerate() {
        let hand = &mut hands[i % players.len()].1;
        *hand = hand.insert(card);
    }
    hands
}

/// Rejects cards that are not part of `deck`.
pub(crate) fn check_card(deck: CardsSet, card: Card) -> Result<(), TurnError> {
    if card.is_valid() && deck.contains(card) {
        Ok(())
    } else {
        Err(TurnError::MalformedTurn(Malformed::UnknownCard(card)))
    }
}

pub(crate) fn check_turn_order(state: &GameState, player: &str) -> Result<(), TurnError> {
    if state.current_player == player {
        Ok(())
    } else {
        Err(TurnError::NotYourTurn {
            player: player.to_owned(),
            current_player: state.current_player.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::fish_deck;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dealing_hands_out_every_card_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let players = ids(&["a", "b", "c", "d"]);
        let hands = deal_round_robin(fish_deck(), &players, &mut rng);
        let mut union = CardsSet::new();
        for (_, hand) in &hands {
            assert!(hand.len() == 13 || hand.len() == 14);
            assert!(union.is_disjoint(*hand));
            union |= *hand;
        }
        assert_eq!(union, fish_deck());
    }

    #[test]
    fn seating_checks() {
        let ok = |n: usize| n == 2;
        assert_eq!(check_players(&ids(&["a", "b"]), "two", ok), Ok(()));
        assert_eq!(
            check_players(&ids(&["a"]), "two", ok),
            Err(SetupError::WrongPlayerCount {
                allowed: "two",
                got: 1
            })
        );
        assert_eq!(
            check_players(&ids(&["a", "a"]), "two", ok),
            Err(SetupError::DuplicatePlayer("a".into()))
        );
        assert_eq!(
            check_players(&ids(&["a", "pile"]), "two", ok),
            Err(SetupError::ReservedPlayerId("pile".into()))
        );
    }
}
