
use thiserror::Error;

/// Every way a ban, move, or external signal can be rejected.
///
/// Rejections are plain values: a failed proposal never mutates the game, so
/// the caller can always retry with different squares against the same state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("operation not accepted in the current phase")]
    WrongPhase,
    #[error("not this player's turn for the current phase")]
    WrongPlayer,
    #[error("ban target is not a legal move for the side to move")]
    IllegalBanTarget,
    #[error("move matches the banned square pair")]
    MoveIsBanned,
    #[error("move is not legal in the current position")]
    IllegalMove,
    #[error("the game is already over")]
    GameAlreadyOver,
    #[error("invalid FEN string: {0}")]
    InvalidFen(String),
    #[error("history index {0} is out of range")]
    HistoryIndex(usize),
    #[error("recorded move {0} does not apply to the replayed position")]
    CorruptHistory(String),
}
