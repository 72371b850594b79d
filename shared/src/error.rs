use serde::{Deserialize, Serialize};

/// Why the validator refused a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum IllegalMove {
    #[error("selected marbles are not all yours")]
    NotOwnMarble,

    #[error("selection is not a straight line of one to three adjacent marbles")]
    NotContiguous,

    #[error("cannot push a group that is as large as or larger than yours")]
    OutnumberedPush,

    #[error("destination is blocked")]
    BlockedDestination,

    #[error("selection is not on the board")]
    OffBoardSelection,
}

/// Rejections produced by the board and the turn engine.
///
/// Every variant is local and recoverable: the match state is unchanged when
/// one is returned, and the error is sent back to whoever submitted the move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("illegal move: {0}")]
    IllegalMove(#[from] IllegalMove),

    #[error("it is not {player}'s turn")]
    OutOfTurn { player: String },

    #[error("the game is already over")]
    MatchOver,
}

/// Errors from parsing user or wire text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid coordinate: {0:?}")]
    InvalidCoord(String),

    #[error("invalid direction: {0:?}")]
    InvalidDirection(String),

    #[error("invalid move: {0:?}")]
    InvalidMove(String),
}
