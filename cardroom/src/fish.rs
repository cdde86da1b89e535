//! Fish, the team game of asking for cards and claiming half-suits.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::rules::{check_card, check_players, check_turn_order, deal_round_robin};
use crate::{
    fish_deck, BadQuestion, Card, CardsSet, GameKind, GameState, HalfSuit, HalfSuitSet, Holding,
    Malformed, OwnerRef, PendingClaim, PlayerId, RuleEngine, SetupError, Status, Transaction,
    Turn, TurnError, TurnRecord, CLAIMING,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct Fish;

fn malformed(reason: Malformed) -> TurnError {
    TurnError::MalformedTurn(reason)
}

fn bad_question(reason: BadQuestion) -> TurnError {
    TurnError::InvalidQuestionTarget(reason)
}

/// Team number of `player`, also while they are claiming.
pub fn team_of(state: &GameState, player: &str) -> Option<u8> {
    match state.status_of(player) {
        code if code > 0 => Some(code as u8),
        CLAIMING => state
            .claim
            .as_ref()
            .filter(|claim| claim.claimant == player)
            .map(|claim| claim.team),
        _ => None,
    }
}

/// The teams that have a `suits_<team>` owner in this game.
pub fn teams(state: &GameState) -> BTreeSet<u8> {
    state
        .owners
        .keys()
        .filter_map(|owner| match owner {
            OwnerRef::TeamSuits(team) => Some(*team),
            _ => None,
        })
        .collect()
}

/// The team that receives a half-suit when `team` gets a claim wrong: the
/// next team number in the game, wrapping around.
pub fn opposing_team(state: &GameState, team: u8) -> u8 {
    let teams = teams(state);
    teams
        .range(team + 1..)
        .next()
        .or_else(|| teams.iter().find(|&&t| t != team))
        .copied()
        .unwrap_or(team)
}

/// Half-suits banked by `team`.
pub fn banked_by(state: &GameState, team: u8) -> HalfSuitSet {
    HalfSuitSet::touched_by(state.cards_of(&OwnerRef::TeamSuits(team)))
}

/// Half-suits banked by any team.
pub fn banked(state: &GameState) -> HalfSuitSet {
    teams(state)
        .into_iter()
        .fold(HalfSuitSet::new(), |acc, team| acc | banked_by(state, team))
}

/// The team with the most banked half-suits, or `None` on a tie.
pub fn winning_team(state: &GameState) -> Option<u8> {
    let mut scores: Vec<(u32, u8)> = teams(state)
        .into_iter()
        .map(|team| (banked_by(state, team).len(), team))
        .collect();
    scores.sort_unstable_by(|a, b| b.cmp(a));
    match scores.as_slice() {
        [(best, team), (second, _), ..] if best > second => Some(*team),
        [(_, team)] => Some(*team),
        _ => None,
    }
}

impl Fish {
    fn check_normal_turn(&self, state: &GameState, player: &str) -> Result<(), TurnError> {
        match state.status {
            Status::Ended => Err(TurnError::GameEnded),
            Status::Claiming => Err(TurnError::ClaimInProgress),
            Status::Normal => check_turn_order(state, player),
        }
    }

    fn check_known_player(&self, state: &GameState, id: &str) -> Result<(), TurnError> {
        if state.is_player(id) {
            Ok(())
        } else {
            Err(malformed(Malformed::UnknownOwner(OwnerRef::player(id))))
        }
    }

    fn validate_question(
        &self,
        state: &GameState,
        player: &str,
        target: &str,
        card: Card,
    ) -> Result<(), TurnError> {
        self.check_normal_turn(state, player)?;
        check_card(self.deck(), card)?;
        self.check_known_player(state, target)?;
        if target == player {
            return Err(bad_question(BadQuestion::AskedSelf));
        }
        if team_of(state, target) == team_of(state, player) {
            return Err(bad_question(BadQuestion::AskedTeammate(target.to_owned())));
        }
        let hand = state.hand(player);
        if hand.contains(card) {
            return Err(bad_question(BadQuestion::AlreadyHoldsCard(card)));
        }
        let half_suit = HalfSuit::of(card);
        if hand.is_disjoint(half_suit.cards()) {
            return Err(bad_question(BadQuestion::NoCardInHalfSuit(half_suit)));
        }
        Ok(())
    }

    fn validate_claim_init(
        &self,
        state: &GameState,
        player: &str,
        card: Card,
    ) -> Result<(), TurnError> {
        self.check_normal_turn(state, player)?;
        check_card(self.deck(), card)?;
        if team_of(state, player).is_none() {
            return Err(malformed(Malformed::NotOnATeam(player.to_owned())));
        }
        let half_suit = HalfSuit::of(card);
        if banked(state).contains(half_suit) {
            return Err(malformed(Malformed::HalfSuitAlreadyClaimed(half_suit)));
        }
        Ok(())
    }

    fn validate_claim_submit(
        &self,
        state: &GameState,
        player: &str,
        team: u8,
        assignments: &[(Card, PlayerId)],
    ) -> Result<(), TurnError> {
        if state.status == Status::Ended {
            return Err(TurnError::GameEnded);
        }
        let claim = match (&state.status, &state.claim) {
            (Status::Claiming, Some(claim)) => claim,
            _ => return Err(malformed(Malformed::NoClaimInProgress)),
        };
        if claim.claimant != player {
            return Err(TurnError::NotYourTurn {
                player: player.to_owned(),
                current_player: claim.claimant.clone(),
            });
        }
        if team != claim.team {
            return Err(malformed(Malformed::UnexpectedOwner(OwnerRef::TeamSuits(
                team,
            ))));
        }
        let mut named = CardsSet::new();
        for (card, holder) in assignments {
            check_card(self.deck(), *card)?;
            if named.contains(*card) {
                return Err(malformed(Malformed::DuplicateCard(*card)));
            }
            named = named.insert(*card);
            self.check_known_player(state, holder)?;
        }
        if named != state.cards_of(&OwnerRef::Options) {
            return Err(malformed(Malformed::ClaimDoesNotMatchOptions));
        }
        Ok(())
    }

    fn validate_delegate(
        &self,
        state: &GameState,
        player: &str,
        to: &str,
    ) -> Result<(), TurnError> {
        self.check_normal_turn(state, player)?;
        if !state.hand(player).is_empty() {
            return Err(malformed(Malformed::DelegateWhileHoldingCards));
        }
        self.check_known_player(state, to)?;
        if to == player || team_of(state, to) != team_of(state, player) {
            return Err(malformed(Malformed::NotATeammate(to.to_owned())));
        }
        Ok(())
    }

    fn apply_question(
        &self,
        mut state: GameState,
        player: &str,
        target: &str,
        card: Card,
    ) -> GameState {
        let success = state.hand(target).contains(card);
        if success {
            state.move_card(card, &OwnerRef::player(target), &OwnerRef::player(player));
        } else {
            state.current_player = target.to_owned();
        }
        state.last_turn = Some(TurnRecord {
            player: player.to_owned(),
            turn_type: crate::turn_type::QUESTION,
            transactions: vec![Transaction {
                sender: OwnerRef::player(target),
                receiver: OwnerRef::player(player),
                card,
                success,
            }],
        });
        state
    }

    fn apply_claim_init(&self, mut state: GameState, player: &str, card: Card) -> GameState {
        let Some(team) = team_of(&state, player) else {
            return state;
        };
        let half_suit = HalfSuit::of(card);
        let mut holders = Vec::with_capacity(6);
        for card in half_suit.cards() {
            if let Some(OwnerRef::Player(holder)) = state.holder_of(card).cloned() {
                state.move_card(card, &OwnerRef::Player(holder.clone()), &OwnerRef::Options);
                holders.push(Holding { card, holder });
            }
        }
        state.claim = Some(PendingClaim {
            claimant: player.to_owned(),
            team,
            half_suit,
            holders,
        });
        state.status = Status::Claiming;
        state.player_status.insert(player.to_owned(), CLAIMING);
        state.last_turn = Some(TurnRecord {
            player: player.to_owned(),
            turn_type: crate::turn_type::CLAIM,
            transactions: vec![Transaction {
                sender: OwnerRef::player(player),
                receiver: OwnerRef::Options,
                card,
                success: true,
            }],
        });
        state
    }

    fn apply_claim_submit(
        &self,
        mut state: GameState,
        assignments: &[(Card, PlayerId)],
    ) -> GameState {
        let Some(claim) = state.claim.take() else {
            return state;
        };
        state
            .player_status
            .insert(claim.claimant.clone(), claim.team as i8);

        let guessed_right = |card: Card, named: &str| {
            claim.holder_of(card) == Some(named) && team_of(&state, named) == Some(claim.team)
        };
        let verdicts: Vec<bool> = assignments
            .iter()
            .map(|(card, named)| guessed_right(*card, named))
            .collect();
        let winner = if verdicts.iter().all(|&ok| ok) {
            claim.team
        } else {
            opposing_team(&state, claim.team)
        };

        let mut transactions = Vec::with_capacity(assignments.len());
        for ((card, named), ok) in assignments.iter().zip(verdicts) {
            transactions.push(Transaction {
                sender: OwnerRef::player(named.as_str()),
                receiver: OwnerRef::TeamSuits(claim.team),
                card: *card,
                success: ok,
            });
            if !ok {
                let actual = claim.holder_of(*card).unwrap_or(named.as_str());
                transactions.push(Transaction {
                    sender: OwnerRef::player(actual),
                    receiver: OwnerRef::TeamSuits(winner),
                    card: *card,
                    success: true,
                });
            }
        }
        let options = state.cards_of(&OwnerRef::Options);
        state.move_cards(options, &OwnerRef::Options, &OwnerRef::TeamSuits(winner));
        state.last_turn = Some(TurnRecord {
            player: claim.claimant.clone(),
            turn_type: crate::turn_type::CLAIM,
            transactions,
        });

        if banked(&state).is_complete() {
            state.status = Status::Ended;
            return state;
        }
        state.status = Status::Normal;
        let next = state
            .clockwise_from(&claim.claimant)
            .find(|p| !state.hand(p).is_empty())
            .cloned();
        if let Some(next) = next {
            state.current_player = next;
        }
        state
    }

    fn apply_delegate(&self, mut state: GameState, player: &str, to: &str) -> GameState {
        state.current_player = to.to_owned();
        state.last_turn = Some(TurnRecord {
            player: player.to_owned(),
            turn_type: crate::turn_type::DELEGATE,
            transactions: Vec::new(),
        });
        state
    }
}

impl RuleEngine for Fish {
    fn kind(&self) -> GameKind {
        GameKind::Fish
    }

    fn deck(&self) -> CardsSet {
        fish_deck()
    }

    fn deal(&self, players: &[PlayerId], rng: &mut StdRng) -> Result<GameState, SetupError> {
        check_players(players, "an even number of 4 to 8", |n| {
            (4..=8).contains(&n) && n % 2 == 0
        })?;
        let hands = deal_round_robin(self.deck(), players, rng);
        let mut state = GameState::seated(
            hands,
            [OwnerRef::Options, OwnerRef::TeamSuits(1), OwnerRef::TeamSuits(2)],
        );
        for (seat, id) in players.iter().enumerate() {
            state.player_status.insert(id.clone(), 1 + (seat % 2) as i8);
        }
        state.current_player = players[rng.gen_range(0..players.len())].clone();
        Ok(state)
    }

    fn validate(&self, state: &GameState, turn: &Turn) -> Result<(), TurnError> {
        match turn {
            Turn::Question {
                player,
                target,
                card,
            } => self.validate_question(state, player, target, *card),
            Turn::ClaimInit { player, card } => self.validate_claim_init(state, player, *card),
            Turn::ClaimSubmit {
                player,
                team,
                assignments,
            } => self.validate_claim_submit(state, player, *team, assignments),
            Turn::Delegate { player, to } => self.validate_delegate(state, player, to),
            Turn::Play { .. } | Turn::Pass { .. } => match state.status {
                Status::Ended => Err(TurnError::GameEnded),
                _ => Err(malformed(Malformed::WrongGame)),
            },
        }
    }

    fn apply(&self, state: GameState, turn: &Turn) -> GameState {
        match turn {
            Turn::Question {
                player,
                target,
                card,
            } => self.apply_question(state, player, target, *card),
            Turn::ClaimInit { player, card } => self.apply_claim_init(state, player, *card),
            Turn::ClaimSubmit { assignments, .. } => self.apply_claim_submit(state, assignments),
            Turn::Delegate { player, to } => self.apply_delegate(state, player, to),
            Turn::Play { .. } | Turn::Pass { .. } => state,
        }
    }
}
