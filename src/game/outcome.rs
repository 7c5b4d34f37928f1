
use chess::Color;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
    Resignation,
    Timeout,
    DrawAgreement,
}

/// Whether the game is still running, and if not, how it ended.
///
/// Set exactly once; a finished game's outcome never reverts short of a full
/// reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameOutcome {
    Active,
    Finished {
        result: GameResult,
        reason: GameOverReason,
    },
}

impl GameOutcome {

    pub fn is_finished(&self) -> bool {
        matches!(self, GameOutcome::Finished { .. })
    }

    pub fn win(winner: Color, reason: GameOverReason) -> GameOutcome {
        let result = match winner {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        };
        GameOutcome::Finished { result, reason }
    }

    pub fn draw(reason: GameOverReason) -> GameOutcome {
        GameOutcome::Finished { result: GameResult::Draw, reason }
    }
}
