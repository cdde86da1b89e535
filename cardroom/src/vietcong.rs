//! The Vietcong shedding game.
//!
//! A round starts with a player leading any combination; the others either
//! beat the combination on the pile or pass for the rest of the round. When
//! only one player is left in the round, that player leads the next one.
//! Players who run out of cards get the next finishing place, and the game
//! ends when only one player still holds cards.

use std::cmp::Ordering;

use rand::rngs::StdRng;

use crate::combination::compare_cards;
use crate::rules::{check_card, check_players, check_turn_order, deal_round_robin};
use crate::{
    standard_deck, Card, CardsSet, Combination, GameKind, GameState, IllegalPlay, Lead, Malformed,
    OwnerRef, PlayerId, Rank, RuleEngine, SetupError, Status, Suit, Transaction, Turn, TurnError,
    TurnRecord, PASSED,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct Vietcong;

const PLAYING: i8 = 0;
const OPENING_CARD: Card = Card::new(Rank::Three, Suit::Spade);

fn is_finished(code: i8) -> bool {
    code > 0
}

impl Vietcong {
    /// The lowest card of the deck. Whoever holds it opens the game and has
    /// to play it.
    pub fn opening_card() -> Card {
        OPENING_CARD
    }

    /// Nothing has been played yet in this game.
    fn is_opening(state: &GameState) -> bool {
        state.cards_of(&OwnerRef::Pile).is_empty()
    }

    fn validate_play(
        &self,
        state: &GameState,
        player: &str,
        cards: &[Card],
    ) -> Result<Combination, TurnError> {
        let illegal = TurnError::IllegalCombination;
        let code = state.status_of(player);
        if is_finished(code) || code == PASSED {
            return Err(illegal(IllegalPlay::NotInRound));
        }
        if cards.is_empty() {
            return Err(TurnError::MalformedTurn(Malformed::WrongTransactionCount {
                expected: "at least one",
                got: 0,
            }));
        }
        let mut played = CardsSet::new();
        for &card in cards {
            check_card(self.deck(), card)?;
            if played.contains(card) {
                return Err(TurnError::MalformedTurn(Malformed::DuplicateCard(card)));
            }
            played = played.insert(card);
        }
        let hand = state.hand(player);
        if let Some(card) = played.into_iter().find(|&c| !hand.contains(c)) {
            return Err(illegal(IllegalPlay::CardNotInHand(card)));
        }
        let combination =
            Combination::classify(cards).ok_or(illegal(IllegalPlay::InvalidCombination))?;
        let opening_card = Self::opening_card();
        if Self::is_opening(state) && !played.contains(opening_card) {
            return Err(illegal(IllegalPlay::MissingOpeningCard(opening_card)));
        }
        if let Some(lead) = &state.lead {
            if !combination.beats(&lead.combination) {
                return Err(illegal(IllegalPlay::DoesNotBeat {
                    played: combination,
                    lead: lead.combination,
                }));
            }
        }
        Ok(combination)
    }

    fn apply_play(&self, mut state: GameState, player: &str, cards: &[Card]) -> GameState {
        let Some(combination) = Combination::classify(cards) else {
            return state;
        };
        let played = CardsSet::from_iter(cards.iter().copied());
        state.move_cards(played, &OwnerRef::player(player), &OwnerRef::Pile);
        state.lead = Some(Lead {
            player: player.to_owned(),
            cards: played,
            combination,
        });
        state.last_turn = Some(TurnRecord {
            player: player.to_owned(),
            turn_type: crate::turn_type::PLAY,
            transactions: cards
                .iter()
                .map(|&card| Transaction {
                    sender: OwnerRef::player(player),
                    receiver: OwnerRef::Pile,
                    card,
                    success: true,
                })
                .collect(),
        });

        if state.hand(player).is_empty() {
            finish(&mut state, player);
            if state.status == Status::Ended {
                return state;
            }
        }

        let next = state
            .clockwise_from(player)
            .find(|p| p.as_str() != player && state.status_of(p) == PLAYING)
            .cloned();
        let in_round = in_round(&state);
        match (next, in_round.as_slice()) {
            (Some(next), [_, _, ..]) => state.current_player = next,
            (_, [survivor]) => {
                let survivor = survivor.clone();
                close_round(&mut state, survivor);
            }
            _ => {
                // The player went out and everybody else has passed already
                let opener = next_unfinished_after(&state, player);
                close_round(&mut state, opener);
            }
        }
        state
    }

    fn apply_pass(&self, mut state: GameState, player: &str) -> GameState {
        state.player_status.insert(player.to_owned(), PASSED);
        state.last_turn = Some(TurnRecord {
            player: player.to_owned(),
            turn_type: crate::turn_type::PASS,
            transactions: Vec::new(),
        });

        let in_round = in_round(&state);
        match in_round.as_slice() {
            [survivor] => {
                let survivor = survivor.clone();
                close_round(&mut state, survivor);
            }
            [] => {
                // The last player to play went out with that play
                let leader = state
                    .lead
                    .as_ref()
                    .map(|lead| lead.player.clone())
                    .unwrap_or_else(|| player.to_owned());
                let opener = next_unfinished_after(&state, &leader);
                close_round(&mut state, opener);
            }
            _ => {
                let next = state
                    .clockwise_from(player)
                    .find(|p| state.status_of(p) == PLAYING)
                    .cloned();
                if let Some(next) = next {
                    state.current_player = next;
                }
            }
        }
        state
    }
}

/// Gives `player` the next finishing place, and ends the game if only one
/// player is left holding cards.
fn finish(state: &mut GameState, player: &str) {
    let taken = state
        .player_status
        .values()
        .filter(|&&code| is_finished(code))
        .count() as i8;
    state.player_status.insert(player.to_owned(), taken + 1);

    let unfinished: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| !is_finished(state.status_of(p)))
        .cloned()
        .collect();
    if let [last] = unfinished.as_slice() {
        state.player_status.insert(last.clone(), taken + 2);
        state.current_player = last.clone();
        state.status = Status::Ended;
    }
}

/// Unfinished players who have not passed in the current round.
fn in_round(state: &GameState) -> Vec<PlayerId> {
    state
        .players
        .iter()
        .filter(|p| state.status_of(p) == PLAYING)
        .cloned()
        .collect()
}

fn next_unfinished_after(state: &GameState, player: &str) -> PlayerId {
    state
        .clockwise_from(player)
        .find(|p| !is_finished(state.status_of(p)))
        .cloned()
        .unwrap_or_else(|| player.to_owned())
}

fn close_round(state: &mut GameState, opener: PlayerId) {
    for code in state.player_status.values_mut() {
        if *code == PASSED {
            *code = PLAYING;
        }
    }
    state.lead = None;
    state.current_player = opener;
}

impl RuleEngine for Vietcong {
    fn kind(&self) -> GameKind {
        GameKind::Vietcong
    }

    fn deck(&self) -> CardsSet {
        standard_deck()
    }

    fn deal(&self, players: &[PlayerId], rng: &mut StdRng) -> Result<GameState, SetupError> {
        check_players(players, "2 to 4", |n| (2..=4).contains(&n))?;
        let hands = deal_round_robin(self.deck(), players, rng);
        let mut state = GameState::seated(hands, [OwnerRef::Pile]);
        let opening_card = Self::opening_card();
        if let Some(OwnerRef::Player(opener)) = state.holder_of(opening_card).cloned() {
            state.current_player = opener;
        }
        Ok(state)
    }

    fn validate(&self, state: &GameState, turn: &Turn) -> Result<(), TurnError> {
        match state.status {
            Status::Ended => return Err(TurnError::GameEnded),
            Status::Claiming => return Err(TurnError::ClaimInProgress),
            Status::Normal => {}
        }
        match turn {
            Turn::Play { player, cards } => {
                check_turn_order(state, player)?;
                self.validate_play(state, player, cards).map(|_| ())
            }
            Turn::Pass { player } => {
                check_turn_order(state, player)?;
                if state.lead.is_none() || in_round(state).len() < 2 {
                    return Err(TurnError::IllegalCombination(
                        IllegalPlay::CannotPassWhenLeading,
                    ));
                }
                Ok(())
            }
            _ => Err(TurnError::MalformedTurn(Malformed::WrongGame)),
        }
    }

    fn apply(&self, state: GameState, turn: &Turn) -> GameState {
        match turn {
            Turn::Play { player, cards } => self.apply_play(state, player, cards),
            Turn::Pass { player } => self.apply_pass(state, player),
            _ => state,
        }
    }
}

/// Sorts cards from lowest to highest in the Vietcong order.
pub fn sort_for_vietcong(cards: &mut [Card]) {
    cards.sort_by(|&a, &b| match compare_cards(a, b) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });
}
