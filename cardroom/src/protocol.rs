use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Card, Malformed, OwnerRef, PlayerId, TurnError};

/// Which rule set a session plays by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Vietcong,
    Fish,
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameKind::Vietcong => write!(f, "vietcong"),
            GameKind::Fish => write!(f, "fish"),
        }
    }
}

impl std::str::FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vietcong" | "viet cong" => Ok(GameKind::Vietcong),
            "fish" => Ok(GameKind::Fish),
            _ => Err(format!("unknown game type '{}'", s)),
        }
    }
}

/// One card moving from `sender` to `receiver`.
///
/// `success` tells observers whether this particular move was a correct
/// guess (Fish questions and claims); it is always true for plain moves and
/// ignored on submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: OwnerRef,
    pub receiver: OwnerRef,
    pub card: Card,
    #[serde(default)]
    pub success: bool,
}

/// A turn in the loosely-typed form that clients submit and observers render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub player: PlayerId,
    #[serde(rename = "type")]
    pub turn_type: u8,
    pub transactions: Vec<Transaction>,
}

/// A turn, with only the fields its kind needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    /// Vietcong: put a combination on the pile.
    Play { player: PlayerId, cards: Vec<Card> },
    /// Vietcong: sit out the rest of the round.
    Pass { player: PlayerId },
    /// Fish: ask `target` for `card`.
    Question {
        player: PlayerId,
        target: PlayerId,
        card: Card,
    },
    /// Fish: start claiming the half-suit of `card`.
    ClaimInit { player: PlayerId, card: Card },
    /// Fish: name the teammate holding each card of the pending claim.
    ClaimSubmit {
        player: PlayerId,
        team: u8,
        assignments: Vec<(Card, PlayerId)>,
    },
    /// Fish: hand the turn to a teammate.
    Delegate { player: PlayerId, to: PlayerId },
}

pub mod turn_type {
    pub const PLAY: u8 = 0;
    pub const PASS: u8 = 1;
    pub const QUESTION: u8 = 0;
    pub const CLAIM: u8 = 1;
    pub const DELEGATE: u8 = 2;
}

fn malformed(reason: Malformed) -> TurnError {
    TurnError::MalformedTurn(reason)
}

fn expect_count(
    transactions: &[Transaction],
    expected: &'static str,
    ok: impl Fn(usize) -> bool,
) -> Result<(), TurnError> {
    if ok(transactions.len()) {
        Ok(())
    } else {
        Err(malformed(Malformed::WrongTransactionCount {
            expected,
            got: transactions.len(),
        }))
    }
}

fn expect_player(owner: &OwnerRef) -> Result<PlayerId, TurnError> {
    owner
        .as_player()
        .map(str::to_owned)
        .ok_or_else(|| malformed(Malformed::UnexpectedOwner(owner.clone())))
}

impl Turn {
    pub fn player(&self) -> &str {
        match self {
            Turn::Play { player, .. }
            | Turn::Pass { player }
            | Turn::Question { player, .. }
            | Turn::ClaimInit { player, .. }
            | Turn::ClaimSubmit { player, .. }
            | Turn::Delegate { player, .. } => player,
        }
    }

    /// The numeric turn type used on the wire.
    pub fn turn_type(&self) -> u8 {
        match self {
            Turn::Play { .. } => turn_type::PLAY,
            Turn::Pass { .. } => turn_type::PASS,
            Turn::Question { .. } => turn_type::QUESTION,
            Turn::ClaimInit { .. } | Turn::ClaimSubmit { .. } => turn_type::CLAIM,
            Turn::Delegate { .. } => turn_type::DELEGATE,
        }
    }

    /// Interprets a submitted turn according to the rules of `game`.
    ///
    /// Only the shape of the turn is checked here; whether it is legal in the
    /// current state is up to the rule engine.
    pub fn decode(game: GameKind, record: &TurnRecord) -> Result<Turn, TurnError> {
        let player = record.player.clone();
        let txs = &record.transactions;
        match (game, record.turn_type) {
            (GameKind::Vietcong, turn_type::PLAY) => {
                expect_count(txs, "at least one", |n| n >= 1)?;
                let mut seen = BTreeSet::new();
                let mut cards = Vec::with_capacity(txs.len());
                for tx in txs {
                    if tx.sender.as_player() != Some(player.as_str()) {
                        return Err(malformed(Malformed::UnexpectedOwner(tx.sender.clone())));
                    }
                    if tx.receiver != OwnerRef::Pile {
                        return Err(malformed(Malformed::UnexpectedOwner(tx.receiver.clone())));
                    }
                    if !seen.insert(tx.card) {
                        return Err(malformed(Malformed::DuplicateCard(tx.card)));
                    }
                    cards.push(tx.card);
                }
                Ok(Turn::Play { player, cards })
            }
            (GameKind::Vietcong, turn_type::PASS) => {
                expect_count(txs, "no", |n| n == 0)?;
                Ok(Turn::Pass { player })
            }
            (GameKind::Fish, turn_type::QUESTION) => {
                expect_count(txs, "exactly one", |n| n == 1)?;
                let tx = &txs[0];
                if tx.receiver.as_player() != Some(player.as_str()) {
                    return Err(malformed(Malformed::UnexpectedOwner(tx.receiver.clone())));
                }
                Ok(Turn::Question {
                    target: expect_player(&tx.sender)?,
                    player,
                    card: tx.card,
                })
            }
            (GameKind::Fish, turn_type::CLAIM) => match txs.len() {
                0 => Err(malformed(Malformed::WrongTransactionCount {
                    expected: "at least one",
                    got: 0,
                })),
                1 => Ok(Turn::ClaimInit {
                    player,
                    card: txs[0].card,
                }),
                _ => {
                    let team = match &txs[0].receiver {
                        OwnerRef::TeamSuits(team) => *team,
                        other => return Err(malformed(Malformed::UnexpectedOwner(other.clone()))),
                    };
                    let mut assignments = Vec::with_capacity(txs.len());
                    for tx in txs {
                        if tx.receiver != OwnerRef::TeamSuits(team) {
                            return Err(malformed(Malformed::UnexpectedOwner(
                                tx.receiver.clone(),
                            )));
                        }
                        assignments.push((tx.card, expect_player(&tx.sender)?));
                    }
                    Ok(Turn::ClaimSubmit {
                        player,
                        team,
                        assignments,
                    })
                }
            },
            (GameKind::Fish, turn_type::DELEGATE) => {
                expect_count(txs, "exactly one", |n| n == 1)?;
                Ok(Turn::Delegate {
                    to: expect_player(&txs[0].sender)?,
                    player,
                })
            }
            (_, other) => Err(malformed(Malformed::UnknownTurnType(other))),
        }
    }
}
