
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of input the game will accept next. Exactly one phase is
/// active at any instant and only the game itself transitions it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// The opponent of the side to move must ban one of their moves.
    AwaitingBan,
    /// The side to move must play a move other than the banned one.
    AwaitingMove,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingBan => write!(f, "awaiting ban"),
            Phase::AwaitingMove => write!(f, "awaiting move"),
            Phase::GameOver => write!(f, "game over"),
        }
    }
}
