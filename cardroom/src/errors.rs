use crate::{Card, Combination, HalfSuit, OwnerRef, PlayerId};

/// The error type for submitting a single turn.
///
/// A turn that fails with any of these leaves the game state untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnError {
    /// The submitting player is not the one whose turn it is (or, during a
    /// Fish claim, not the claimant).
    NotYourTurn {
        player: PlayerId,
        current_player: PlayerId,
    },
    /// A Vietcong play (or pass) that the rules do not allow.
    IllegalCombination(IllegalPlay),
    /// A Fish question that breaks the half-suit or team constraints.
    InvalidQuestionTarget(BadQuestion),
    /// A normal turn was submitted while a Fish claim is being resolved.
    ClaimInProgress,
    /// The game is over and accepts no more turns.
    GameEnded,
    /// The turn is structurally invalid for its declared type.
    MalformedTurn(Malformed),
}

/// Why a Vietcong play or pass was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IllegalPlay {
    CardNotInHand(Card),
    InvalidCombination,
    /// The first play of a game must contain the lowest card of the deck.
    MissingOpeningCard(Card),
    DoesNotBeat {
        played: Combination,
        lead: Combination,
    },
    /// The player leads the round and therefore has to play.
    CannotPassWhenLeading,
    /// The player has already passed in this round or has finished.
    NotInRound,
}

/// Why a Fish question was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BadQuestion {
    AskedSelf,
    AskedTeammate(PlayerId),
    /// The asker holds no card of the half-suit they are asking about.
    NoCardInHalfSuit(HalfSuit),
    AlreadyHoldsCard(Card),
}

/// Why a turn was considered structurally invalid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Malformed {
    UnknownTurnType(u8),
    /// The turn kind belongs to the other game.
    WrongGame,
    WrongTransactionCount { expected: &'static str, got: usize },
    UnknownCard(Card),
    DuplicateCard(Card),
    UnknownOwner(OwnerRef),
    /// A transaction's sender or receiver does not fit the turn type.
    UnexpectedOwner(OwnerRef),
    /// Claim assignments must name every pending card exactly once.
    ClaimDoesNotMatchOptions,
    NoClaimInProgress,
    HalfSuitAlreadyClaimed(HalfSuit),
    NotOnATeam(PlayerId),
    NotATeammate(PlayerId),
    DelegateWhileHoldingCards,
}

impl std::error::Error for TurnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TurnError::IllegalCombination(err) => Some(err),
            TurnError::InvalidQuestionTarget(err) => Some(err),
            TurnError::MalformedTurn(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for TurnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnError::NotYourTurn {
                player,
                current_player,
            } => write!(
                f,
                "It is not {}'s turn, it is {}'s turn",
                player, current_player
            ),
            TurnError::IllegalCombination(_) => write!(f, "Illegal combination"),
            TurnError::InvalidQuestionTarget(_) => write!(f, "Invalid question target"),
            TurnError::ClaimInProgress => {
                write!(f, "A claim is in progress and must be resolved first")
            }
            TurnError::GameEnded => write!(f, "The game has ended"),
            TurnError::MalformedTurn(_) => write!(f, "Malformed turn"),
        }
    }
}

impl std::error::Error for IllegalPlay {}

impl std::fmt::Display for IllegalPlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IllegalPlay::CardNotInHand(card) => {
                write!(f, "Tried to play {}, which is not in the player's hand", card)
            }
            IllegalPlay::InvalidCombination => {
                write!(f, "The cards do not form a valid combination")
            }
            IllegalPlay::MissingOpeningCard(card) => {
                write!(f, "The opening play of the game must contain {}", card)
            }
            IllegalPlay::DoesNotBeat { played, lead } => {
                write!(f, "A {} does not beat a {}", played, lead)
            }
            IllegalPlay::CannotPassWhenLeading => {
                write!(f, "The player leads this round and cannot pass")
            }
            IllegalPlay::NotInRound => {
                write!(f, "The player has passed in this round or already finished")
            }
        }
    }
}

impl std::error::Error for BadQuestion {}

impl std::fmt::Display for BadQuestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BadQuestion::AskedSelf => write!(f, "A player cannot ask themselves"),
            BadQuestion::AskedTeammate(id) => {
                write!(f, "{} is a teammate and cannot be asked", id)
            }
            BadQuestion::NoCardInHalfSuit(half_suit) => write!(
                f,
                "Only half-suits the asker holds a card of can be asked about, not {}",
                half_suit
            ),
            BadQuestion::AlreadyHoldsCard(card) => {
                write!(f, "The asker already holds {}", card)
            }
        }
    }
}

impl std::error::Error for Malformed {}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::UnknownTurnType(t) => write!(f, "Unknown turn type {}", t),
            Malformed::WrongGame => write!(f, "This turn belongs to a different game"),
            Malformed::WrongTransactionCount { expected, got } => write!(
                f,
                "Expected {} transactions, but got {}",
                expected, got
            ),
            Malformed::UnknownCard(card) => {
                write!(f, "{:?} is not a card of this game", card)
            }
            Malformed::DuplicateCard(card) => write!(f, "{} appears more than once", card),
            Malformed::UnknownOwner(owner) => write!(f, "There is no owner '{}'", owner),
            Malformed::UnexpectedOwner(owner) => {
                write!(f, "'{}' does not fit this kind of turn", owner)
            }
            Malformed::ClaimDoesNotMatchOptions => write!(
                f,
                "A claim must assign every card of the half-suit exactly once"
            ),
            Malformed::NoClaimInProgress => write!(f, "There is no claim to submit"),
            Malformed::HalfSuitAlreadyClaimed(half_suit) => {
                write!(f, "The {} have already been claimed", half_suit)
            }
            Malformed::NotOnATeam(id) => write!(f, "{} is not on a team", id),
            Malformed::NotATeammate(id) => write!(f, "{} is not a teammate", id),
            Malformed::DelegateWhileHoldingCards => {
                write!(f, "Only a player without cards can hand over their turn")
            }
        }
    }
}

/// The error type for dealing a new game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    WrongPlayerCount { allowed: &'static str, got: usize },
    DuplicatePlayer(PlayerId),
    /// The id is empty or collides with a pseudo-owner key such as `pile`.
    ReservedPlayerId(PlayerId),
}

impl std::error::Error for SetupError {}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::WrongPlayerCount { allowed, got } => write!(
                f,
                "This game needs {} players, but {} were given",
                allowed, got
            ),
            SetupError::DuplicatePlayer(id) => write!(f, "Player '{}' is seated twice", id),
            SetupError::ReservedPlayerId(id) => {
                write!(f, "'{}' cannot be used as a player id", id)
            }
        }
    }
}
