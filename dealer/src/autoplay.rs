//! A player that picks a random turn for whoever is to move.
//!
//! The proposals only use what is in the state, so they are usually legal
//! but not always; the rule engines have the final word.

use std::collections::BTreeMap;

use cardroom::{
    rank_value, sort_for_vietcong, team_of, Card, CardsSet, GameKind, GameState, HalfSuit,
    OwnerRef, PlayerId, RuleEngine, Status, Turn, Vietcong,
};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use tracing::debug;

use crate::{Dealer, SessionError, SessionId, SessionOutcome};

/// Picks a turn for the current player, or `None` once the game has ended.
pub fn propose_turn(kind: GameKind, state: &GameState, rng: &mut StdRng) -> Option<Turn> {
    if state.status == Status::Ended {
        return None;
    }
    Some(match kind {
        GameKind::Vietcong => propose_vietcong(state, rng),
        GameKind::Fish => propose_fish(state, rng),
    })
}

/// Groups of cards from `hand` that may form a combination: every single,
/// pair, triple and quartet, and runs of singles, pairs or quartets.
fn vietcong_candidates(hand: CardsSet) -> Vec<Vec<Card>> {
    let mut by_rank: BTreeMap<u8, Vec<Card>> = BTreeMap::new();
    for card in hand {
        by_rank.entry(rank_value(card.rank)).or_default().push(card);
    }
    for group in by_rank.values_mut() {
        sort_for_vietcong(group);
    }

    let mut candidates = Vec::new();
    for group in by_rank.values() {
        for n in 1..=group.len() {
            candidates.push(group[..n].to_vec());
        }
    }
    for (width, min_len) in [(1, 3), (2, 3), (4, 2)] {
        let ranks: Vec<u8> = by_rank
            .iter()
            .filter(|(_, group)| group.len() >= width)
            .map(|(&rank, _)| rank)
            .collect();
        for start in 0..ranks.len() {
            let mut end = start + 1;
            while end < ranks.len() && ranks[end] == ranks[end - 1] + 1 {
                end += 1;
                if end - start >= min_len {
                    candidates.push(
                        ranks[start..end]
                            .iter()
                            .flat_map(|rank| by_rank[rank][..width].iter().copied())
                            .collect(),
                    );
                }
            }
        }
    }
    candidates
}

fn propose_vietcong(state: &GameState, rng: &mut StdRng) -> Turn {
    let player = state.current_player.clone();
    let plays: Vec<Turn> = vietcong_candidates(state.hand(&player))
        .into_iter()
        .map(|cards| Turn::Play {
            player: player.clone(),
            cards,
        })
        .filter(|turn| Vietcong.validate(state, turn).is_ok())
        .collect();
    let may_pass = state.lead.is_some();
    if may_pass && (plays.is_empty() || rng.gen_ratio(1, 4)) {
        return Turn::Pass { player };
    }
    plays
        .choose(rng)
        .cloned()
        .unwrap_or(Turn::Pass { player })
}

fn propose_fish(state: &GameState, rng: &mut StdRng) -> Turn {
    if let Some(claim) = &state.claim {
        let teammates: Vec<&PlayerId> = state
            .players
            .iter()
            .filter(|p| team_of(state, p) == Some(claim.team))
            .collect();
        let assignments = state
            .cards_of(&OwnerRef::Options)
            .into_iter()
            .map(|card| {
                let guess = match claim.holder_of(card) {
                    Some(holder) if holder == claim.claimant => claim.claimant.clone(),
                    _ => teammates
                        .choose(rng)
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| claim.claimant.clone()),
                };
                (card, guess)
            })
            .collect();
        return Turn::ClaimSubmit {
            player: claim.claimant.clone(),
            team: claim.team,
            assignments,
        };
    }

    let player = state.current_player.clone();
    let team = team_of(state, &player);
    let hand = state.hand(&player);
    let claim_any = |rng: &mut StdRng| {
        let unclaimed: CardsSet = state
            .players
            .iter()
            .fold(CardsSet::new(), |acc, p| acc | state.hand(p));
        Turn::ClaimInit {
            player: player.clone(),
            card: unclaimed
                .into_iter()
                .choose(rng)
                .unwrap_or(cardroom::BLACK_JOKER),
        }
    };

    if hand.is_empty() {
        let helper = state
            .players
            .iter()
            .filter(|p| **p != player && team_of(state, p) == team && !state.hand(p).is_empty())
            .choose(rng);
        return match helper {
            Some(to) => Turn::Delegate {
                player: player.clone(),
                to: to.clone(),
            },
            None => claim_any(rng),
        };
    }

    let held: Vec<HalfSuit> = HalfSuit::all()
        .filter(|half_suit| !hand.is_disjoint(half_suit.cards()))
        .collect();
    if rng.gen_ratio(1, 6) {
        if let Some(half_suit) = held.choose(rng) {
            if let Some(card) = (hand & half_suit.cards()).into_iter().next() {
                return Turn::ClaimInit {
                    player: player.clone(),
                    card,
                };
            }
        }
    }
    let wanted = held
        .iter()
        .fold(CardsSet::new(), |acc, half_suit| acc | half_suit.cards())
        & !hand;
    let opponent = state
        .players
        .iter()
        .filter(|p| team_of(state, p) != team)
        .choose(rng);
    match (wanted.into_iter().choose(rng), opponent) {
        (Some(card), Some(target)) => Turn::Question {
            player: player.clone(),
            target: target.clone(),
            card,
        },
        _ => claim_any(rng),
    }
}

/// Lets random players take every turn of a session until the game ends or
/// `max_turns` turns have been submitted.
///
/// Returns the outcome if the game ended.
pub async fn play_out(
    dealer: &Dealer,
    id: SessionId,
    rng: &mut StdRng,
    max_turns: usize,
) -> Result<Option<SessionOutcome>, SessionError> {
    let kind = dealer.kind(id)?;
    for _ in 0..max_turns {
        let state = dealer.snapshot(id)?.state;
        let Some(turn) = propose_turn(kind, &state, rng) else {
            break;
        };
        match dealer.submit_turn(id, turn).await {
            Ok(_) => {}
            Err(SessionError::Turn(err)) => {
                debug!(session = %id, %err, "Random turn was rejected");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(dealer.ended_session(id))
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;
    use rand::SeedableRng;

    use super::*;

    /// Plays a whole game without a dealer, checking the state after every turn.
    fn random_game(kind: GameKind, seed: u64) -> Option<GameState> {
        let mut rng = StdRng::seed_from_u64(seed);
        let engine = kind.engine();
        let num_players = match kind {
            GameKind::Vietcong => 2 + (seed % 3) as usize,
            GameKind::Fish => 4 + 2 * (seed % 3) as usize,
        };
        let players: Vec<PlayerId> = (1..=num_players).map(|i| format!("p{}", i)).collect();
        let mut state = engine.deal(&players, &mut rng).ok()?;
        for _ in 0..10_000 {
            let Some(turn) = propose_turn(kind, &state, &mut rng) else {
                return Some(state);
            };
            match engine.play(&state, &turn) {
                Ok(next) => state = next,
                Err(_) => continue,
            }
            if !state.is_partition_of(engine.deck()) {
                return None;
            }
        }
        None
    }

    quickcheck! {
        fn vietcong_games_end_with_every_card_owned(seed: u64) -> bool {
            match random_game(GameKind::Vietcong, seed) {
                Some(state) => {
                    let mut places: Vec<i8> = state.player_status.values().copied().collect();
                    places.sort_unstable();
                    places == (1..=state.players.len() as i8).collect::<Vec<_>>()
                }
                None => false,
            }
        }

        fn fish_games_end_with_every_half_suit_banked(seed: u64) -> bool {
            match random_game(GameKind::Fish, seed) {
                Some(state) => {
                    state.status == Status::Ended
                        && state.cards_of(&OwnerRef::Options).is_empty()
                        && state.players.iter().all(|p| state.hand(p).is_empty())
                }
                None => false,
            }
        }
    }

    #[test]
    fn candidates_include_runs() {
        let hand: CardsSet = ["3♠", "4♠", "5♥", "5♦", "4♣", "3♣", "2♠"]
            .iter()
            .map(|c| c.parse::<Card>().unwrap())
            .collect();
        let candidates = vietcong_candidates(hand);
        assert!(candidates.iter().any(|c| c.len() == 3
            && cardroom::Combination::classify(c).map(|c| c.shape)
                == Some(cardroom::Shape::Sequence)));
        assert!(candidates.iter().any(|c| c.len() == 6
            && cardroom::Combination::classify(c).map(|c| c.shape)
                == Some(cardroom::Shape::DoubleSequence)));
        assert!(candidates.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn proposes_nothing_after_the_end() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = Vietcong
            .deal(&["a".to_string(), "b".to_string()], &mut rng)
            .unwrap();
        state.status = Status::Ended;
        assert!(propose_turn(GameKind::Vietcong, &state, &mut rng).is_none());
    }
}
