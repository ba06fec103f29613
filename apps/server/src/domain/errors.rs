use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Domain-level error type, transport-agnostic.
///
/// Room handlers treat these as protocol violations: the command is
/// logged and discarded without mutating state, and nothing is sent
/// back over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    OutOfTurn,
    PhaseMismatch,
    CardIndexOutOfRange,
    InvalidGuess,
    NotEnoughPlayers,
    DuplicateSession,
    UnknownPlayer,
    GameInProgress,
    RoomFull,
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::OutOfTurn => write!(f, "out of turn"),
            DomainError::PhaseMismatch => write!(f, "phase mismatch"),
            DomainError::CardIndexOutOfRange => write!(f, "card index out of range"),
            DomainError::InvalidGuess => write!(f, "invalid guess"),
            DomainError::NotEnoughPlayers => write!(f, "not enough players"),
            DomainError::DuplicateSession => write!(f, "persistent id already in use"),
            DomainError::UnknownPlayer => write!(f, "player not in this game"),
            DomainError::GameInProgress => write!(f, "game already in progress"),
            DomainError::RoomFull => write!(f, "room is full"),
        }
    }
}

impl Error for DomainError {}
