use cardroom::{SetupError, TurnError};

use crate::SessionId;

/// The error type for requests to the [`Dealer`](crate::Dealer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    UnknownSession(SessionId),
    /// The turn was rejected; the session state is unchanged.
    Turn(TurnError),
    /// The game could not be dealt.
    Setup(SetupError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Turn(err) => Some(err),
            SessionError::Setup(err) => Some(err),
            SessionError::UnknownSession(_) => None,
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::UnknownSession(id) => write!(f, "There is no session {}", id),
            SessionError::Turn(err) => write!(f, "Turn rejected: {}", err),
            SessionError::Setup(err) => write!(f, "Could not start the game: {}", err),
        }
    }
}

impl From<TurnError> for SessionError {
    fn from(err: TurnError) -> Self {
        SessionError::Turn(err)
    }
}

impl From<SetupError> for SessionError {
    fn from(err: SetupError) -> Self {
        SessionError::Setup(err)
    }
}
