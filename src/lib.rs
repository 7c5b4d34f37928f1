mod error;
mod game;
mod history;
mod js_interface;
mod logger;
mod position;
mod utils;

pub use error::GameError;
pub use game::{
    BanChessGame, GameOutcome, GameOverReason, GameResult, GameState, Phase,
    Snapshot,
};
pub use history::{
    BanEntry, BannedMove, GameEvent, Ledger, MoveEntry, MoveRecord, TurnEntry,
};
pub use logger::Logger;
pub use position::{parse_square, Position};

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;
