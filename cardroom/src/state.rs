use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Card, CardsSet, Combination, HalfSuit, TurnRecord};

pub type PlayerId = String;

/// A holder of cards.
///
/// On the wire this is the key of the `owners` map: the player id itself, or
/// one of the pseudo-owner keys `pile`, `options` and `suits_<team>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OwnerRef {
    Player(PlayerId),
    /// Cards played to the table in Vietcong.
    Pile,
    /// The cards of a half-suit while a Fish claim is being resolved.
    Options,
    /// The half-suits banked by a Fish team.
    TeamSuits(u8),
}

impl OwnerRef {
    pub fn player(id: impl Into<PlayerId>) -> Self {
        OwnerRef::Player(id.into())
    }

    pub fn as_player(&self) -> Option<&str> {
        match self {
            OwnerRef::Player(id) => Some(id),
            _ => None,
        }
    }

    /// Whether a player with this id would be mistaken for a pseudo-owner.
    pub fn is_reserved_id(id: &str) -> bool {
        id.is_empty() || OwnerRef::from(id.to_owned()).as_player().is_none()
    }
}

impl From<String> for OwnerRef {
    fn from(key: String) -> Self {
        match key.as_str() {
            "pile" => OwnerRef::Pile,
            "options" => OwnerRef::Options,
            _ => match key.strip_prefix("suits_").map(str::parse::<u8>) {
                Some(Ok(team)) => OwnerRef::TeamSuits(team),
                _ => OwnerRef::Player(key),
            },
        }
    }
}

impl From<OwnerRef> for String {
    fn from(owner: OwnerRef) -> Self {
        owner.to_string()
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerRef::Player(id) => write!(f, "{}", id),
            OwnerRef::Pile => write!(f, "pile"),
            OwnerRef::Options => write!(f, "options"),
            OwnerRef::TeamSuits(team) => write!(f, "suits_{}", team),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub cards: CardsSet,
    pub is_player: bool,
}

/// The overall state of a game, serialized as its numeric code.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Status {
    Normal = 0,
    Ended = 1,
    /// A Fish claim is being resolved; normal turns are frozen.
    Claiming = 2,
}

impl TryFrom<u8> for Status {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Normal),
            1 => Ok(Status::Ended),
            2 => Ok(Status::Claiming),
            _ => Err(format!("unknown status {}", value)),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> u8 {
        status as u8
    }
}

/// `player_status` code of a Vietcong player who passed in the current round,
/// and of a Fish player who is currently claiming.
pub const PASSED: i8 = -1;
pub const CLAIMING: i8 = -1;

/// The combination to beat in the current Vietcong round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub player: PlayerId,
    pub cards: CardsSet,
    pub combination: Combination,
}

/// A Fish claim between its initiation and its submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClaim {
    pub claimant: PlayerId,
    /// The claimant's team, while their `player_status` reads "claiming".
    pub team: u8,
    pub half_suit: HalfSuit,
    /// Who held each card of the half-suit before it was moved to `options`.
    pub holders: Vec<Holding>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub card: Card,
    pub holder: PlayerId,
}

impl PendingClaim {
    pub fn holder_of(&self, card: Card) -> Option<&str> {
        self.holders
            .iter()
            .find(|h| h.card == card)
            .map(|h| h.holder.as_str())
    }
}

/// The authoritative state of one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub current_player: PlayerId,
    pub status: Status,
    pub owners: BTreeMap<OwnerRef, Owner>,
    pub player_status: BTreeMap<PlayerId, i8>,
    pub last_turn: Option<TurnRecord>,
    /// Seating order, clockwise.
    pub players: Vec<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead: Option<Lead>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<PendingClaim>,
}

impl GameState {
    /// Seats the players with the given hands, in order, plus empty pseudo-owners.
    ///
    /// The first player is the current player and every `player_status` is 0.
    pub fn seated(
        hands: Vec<(PlayerId, CardsSet)>,
        pseudo_owners: impl IntoIterator<Item = OwnerRef>,
    ) -> Self {
        let players: Vec<PlayerId> = hands.iter().map(|(id, _)| id.clone()).collect();
        let mut owners = BTreeMap::new();
        for (id, cards) in hands {
            owners.insert(
                OwnerRef::Player(id),
                Owner {
                    cards,
                    is_player: true,
                },
            );
        }
        for owner in pseudo_owners {
            owners.insert(owner, Owner::default());
        }
        Self {
            current_player: players.first().cloned().unwrap_or_default(),
            status: Status::Normal,
            player_status: players.iter().map(|id| (id.clone(), 0)).collect(),
            owners,
            last_turn: None,
            players,
            lead: None,
            claim: None,
        }
    }

    pub fn is_player(&self, id: &str) -> bool {
        self.players.iter().any(|p| p == id)
    }

    pub fn cards_of(&self, owner: &OwnerRef) -> CardsSet {
        self.owners
            .get(owner)
            .map(|o| o.cards)
            .unwrap_or_default()
    }

    pub fn hand(&self, player: &str) -> CardsSet {
        self.cards_of(&OwnerRef::player(player))
    }

    pub fn status_of(&self, player: &str) -> i8 {
        self.player_status.get(player).copied().unwrap_or(0)
    }

    pub fn holder_of(&self, card: Card) -> Option<&OwnerRef> {
        self.owners
            .iter()
            .find(|(_, owner)| owner.cards.contains(card))
            .map(|(owner_ref, _)| owner_ref)
    }

    /// Moves a card between two existing owners.
    pub(crate) fn move_card(&mut self, card: Card, from: &OwnerRef, to: &OwnerRef) {
        if let Some(owner) = self.owners.get_mut(from) {
            debug_assert!(owner.cards.contains(card), "{} does not hold {}", from, card);
            owner.cards = owner.cards.remove(card);
        }
        let owner = self.owners.entry(to.clone()).or_default();
        owner.cards = owner.cards.insert(card);
    }

    pub(crate) fn move_cards(&mut self, cards: CardsSet, from: &OwnerRef, to: &OwnerRef) {
        for card in cards {
            self.move_card(card, from, to);
        }
    }

    /// All players after `player` in clockwise order, ending with `player` itself.
    pub fn clockwise_from<'a>(&'a self, player: &str) -> impl Iterator<Item = &'a PlayerId> {
        let seat = self
            .players
            .iter()
            .position(|p| p == player)
            .unwrap_or(self.players.len().saturating_sub(1));
        self.players
            .iter()
            .cycle()
            .skip(seat + 1)
            .take(self.players.len())
    }

    /// Whether the owners hold exactly the cards of `deck`, each card exactly once.
    pub fn is_partition_of(&self, deck: CardsSet) -> bool {
        let mut seen = CardsSet::new();
        for owner in self.owners.values() {
            if !seen.is_disjoint(owner.cards) {
                return false;
            }
            seen |= owner.cards;
        }
        seen == deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{card, standard_deck};

    fn two_players() -> GameState {
        GameState::seated(
            vec![
                ("ann".into(), CardsSet::from_iter([card!("3♠"), card!("4♠")])),
                ("bob".into(), CardsSet::from_iter([card!("5♠")])),
            ],
            [OwnerRef::Pile],
        )
    }

    #[test]
    fn owner_keys_round_trip() {
        for key in ["pile", "options", "suits_1", "suits_3", "alice", "suits_x", ""] {
            let owner = OwnerRef::from(key.to_owned());
            assert_eq!(owner.to_string(), key);
        }
        assert_eq!(OwnerRef::from("suits_2".to_owned()), OwnerRef::TeamSuits(2));
        assert!(OwnerRef::is_reserved_id("options"));
        assert!(OwnerRef::is_reserved_id(""));
        assert!(!OwnerRef::is_reserved_id("suits_x"));
    }

    #[test]
    fn serialized_state_uses_wire_names() {
        let state = two_players();
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["current_player"], "ann");
        assert_eq!(json["status"], 0);
        assert_eq!(json["owners"]["pile"]["is_player"], false);
        assert_eq!(json["owners"]["bob"]["cards"][0]["rank"], 5);
        assert_eq!(json["player_status"]["bob"], 0);
        assert!(json.get("lead").is_none());
        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn moving_cards_keeps_them_owned_once() {
        let mut state = two_players();
        let deck = state.hand("ann") | state.hand("bob");
        state.move_card(card!("3♠"), &OwnerRef::player("ann"), &OwnerRef::Pile);
        assert!(state.is_partition_of(deck));
        assert_eq!(state.holder_of(card!("3♠")), Some(&OwnerRef::Pile));
        assert!(!state.is_partition_of(standard_deck()));
    }

    #[test]
    fn clockwise_order_wraps_around() {
        let mut state = two_players();
        state.players.push("cat".into());
        let order: Vec<&str> = state.clockwise_from("bob").map(String::as_str).collect();
        assert_eq!(order, vec!["cat", "ann", "bob"]);
    }
}
