
mod outcome;
mod phase;
mod snapshot;

#[cfg(test)] mod tests;

pub use outcome::{GameOutcome, GameOverReason, GameResult};
pub use phase::Phase;
pub use snapshot::Snapshot;

use chess::{BoardStatus, Color, Piece, Square};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::error::GameError;
use crate::history::{
    color_name, BanEntry, BannedMove, GameEvent, Ledger, MoveRecord, TurnEntry
};
use crate::logger::Logger;
use crate::position::Position;

/// A Ban Chess game: before each move, the opponent of the player about to
/// move bans one of that player's legal moves.
///
/// The game is a pure synchronous state machine. Proposals either succeed and
/// advance the phase, or fail with a [`GameError`] and leave every field
/// untouched. It knows nothing about where proposals come from; local play,
/// networked play and spectating all drive the same object.
#[wasm_bindgen]
#[derive(Clone)]
pub struct BanChessGame {
    pub(crate) position: Position,
    pub(crate) phase: Phase,
    pub(crate) banned: Option<BannedMove>,
    pub(crate) outcome: GameOutcome,
    pub(crate) ledger: Ledger,
    pub(crate) draw_offer: Option<Color>,
    pub(crate) logger: Logger,
}

impl BanChessGame {

    /// A fresh game from the standard starting position. Black bans first,
    /// choosing among White's opening moves.
    pub fn new() -> BanChessGame {
        BanChessGame::with_logger(Logger::new(0))
    }

    pub fn with_logger(logger: Logger) -> BanChessGame {
        let position = Position::initial();
        BanChessGame {
            ledger: Ledger::new(position.clone()),
            position,
            phase: Phase::AwaitingBan,
            banned: None,
            outcome: GameOutcome::Active,
            draw_offer: None,
            logger,
        }
    }

    /// Starts a game from an arbitrary position. The opponent of the side to
    /// move bans first, as always.
    pub fn from_fen(fen: &str) -> Result<BanChessGame, GameError> {
        let position = Position::from_fen(fen)?;
        Ok(BanChessGame {
            ledger: Ledger::new(position.clone()),
            position,
            phase: Phase::AwaitingBan,
            banned: None,
            outcome: GameOutcome::Active,
            draw_offer: None,
            logger: Logger::new(0),
        })
    }

    /// Rebuilds a game by pushing an authoritative event log through a fresh
    /// state machine, validating every entry along the way.
    pub fn replay(events: &[GameEvent]) -> Result<BanChessGame, GameError> {
        let mut game = BanChessGame::new();
        for event in events {
            match event {
                GameEvent::Ban(ban) => {
                    game.ban(ban.from, ban.to, ban.banned_by)?;
                }
                GameEvent::Move(record) => {
                    game.make_move(
                        record.from, record.to, record.promotion, record.color
                    )?;
                }
            }
        }
        Ok(game)
    }

    // ------------------------------------------------------------------
    // Ban rule engine
    // ------------------------------------------------------------------

    /// Bans one of the side-to-move's legal moves. Only the opponent of the
    /// side to move may ban, and only during `AwaitingBan`.
    ///
    /// The ban targets the square pair: a banned promotion forbids every
    /// promotion piece. The board itself is never touched.
    pub fn ban(
        &mut self, from: Square, to: Square, requesting: Color
    ) -> Result<BannedMove, GameError> {
        if self.outcome.is_finished() {
            return Err(GameError::GameAlreadyOver);
        }
        if self.phase != Phase::AwaitingBan {
            return Err(GameError::WrongPhase);
        }
        if requesting != self.side_to_ban() {
            return Err(GameError::WrongPlayer);
        }
        if !self.position.legal_pairs().contains(&(from, to)) {
            return Err(GameError::IllegalBanTarget);
        }

        let ban = BannedMove {
            from,
            to,
            banned_by: requesting,
            at_turn: self.position.fullmove_number(),
        };
        self.banned = Some(ban);
        self.draw_offer = None;
        self.ledger.append(GameEvent::Ban(ban));
        self.logger.log_lazy(2, || {
            format!("{} bans {}", color_name(requesting), ban.uci())
        });

        match self.detect_after_ban(&ban) {
            Some(outcome) => self.finish(outcome),
            None => self.phase = Phase::AwaitingMove,
        }
        Ok(ban)
    }

    // ------------------------------------------------------------------
    // Move rule engine
    // ------------------------------------------------------------------

    /// Plays a move for the side to move during `AwaitingMove`.
    ///
    /// The banned square pair is rejected before legality is even consulted,
    /// so a fully legal move still fails with `MoveIsBanned`. On success the
    /// ban is cleared, the move is applied and recorded, and the mover
    /// becomes the next banner.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
        requesting: Color,
    ) -> Result<MoveRecord, GameError> {
        if self.outcome.is_finished() {
            return Err(GameError::GameAlreadyOver);
        }
        if self.phase != Phase::AwaitingMove {
            return Err(GameError::WrongPhase);
        }
        if requesting != self.position.side_to_move() {
            return Err(GameError::WrongPlayer);
        }
        if let Some(ban) = &self.banned {
            if ban.pair() == (from, to) {
                return Err(GameError::MoveIsBanned);
            }
        }
        let m = self.position.find_move(from, to, promotion)
            .ok_or(GameError::IllegalMove)?;

        let san = self.position.san(m);
        let turn_number = self.position.fullmove_number();
        self.position.apply(m);

        let record = MoveRecord {
            from,
            to,
            promotion,
            san,
            fen_after: self.position.fen(),
            turn_number,
            color: requesting,
            banned_this_turn: self.banned.take(),
        };
        self.draw_offer = None;
        self.ledger.append(GameEvent::Move(record.clone()));
        self.logger.log_lazy(2, || {
            format!(
                "{}. {} plays {}",
                turn_number, color_name(requesting), record.san
            )
        });

        match self.detect_after_move(requesting) {
            Some(outcome) => self.finish(outcome),
            None => self.phase = Phase::AwaitingBan,
        }
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Game-over detection
    // ------------------------------------------------------------------

    /// The variant-specific mate: in check with exactly one legal square
    /// pair, and that pair just got banned. Standard chess would not call
    /// this checkmate because one legal move remains on the board.
    ///
    /// A ban that strips the last move of a side NOT in check is not an
    /// immediate stalemate; the game stays in `AwaitingMove` and the caller
    /// can see the empty set via [`BanChessGame::legal_moves_excluding_ban`].
    fn detect_after_ban(&self, ban: &BannedMove) -> Option<GameOutcome> {
        if !self.position.in_check() {
            return None;
        }
        let blocked = self.position.legal_pairs()
            .iter()
            .all(|&pair| pair == ban.pair());
        if blocked {
            Some(GameOutcome::win(ban.banned_by, GameOverReason::Checkmate))
        } else {
            None
        }
    }

    /// Ordinary chess endings still apply after a move that was not banned:
    /// checkmate, stalemate, and the automatic draws the position engine
    /// does not track itself.
    fn detect_after_move(&self, mover: Color) -> Option<GameOutcome> {
        match self.position.status() {
            BoardStatus::Checkmate => {
                Some(GameOutcome::win(mover, GameOverReason::Checkmate))
            }
            BoardStatus::Stalemate => {
                Some(GameOutcome::draw(GameOverReason::Stalemate))
            }
            BoardStatus::Ongoing => {
                if self.position.insufficient_material() {
                    Some(GameOutcome::draw(GameOverReason::InsufficientMaterial))
                } else if self.position.halfmove_clock() >= 100 {
                    Some(GameOutcome::draw(GameOverReason::FiftyMoveRule))
                } else if self.position.repetition_count() >= 3 {
                    Some(GameOutcome::draw(GameOverReason::ThreefoldRepetition))
                } else {
                    None
                }
            }
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.outcome = outcome;
        self.phase = Phase::GameOver;
        self.banned = None;
        self.draw_offer = None;
        self.logger.log_lazy(1, || format!("game over: {:?}", outcome));
    }

    // ------------------------------------------------------------------
    // External signals
    // ------------------------------------------------------------------

    /// Resignation is an authoritative external fact: it is not validated
    /// against the phase and always ends the game in favor of the opponent.
    pub fn resign(&mut self, color: Color) -> Result<(), GameError> {
        if self.outcome.is_finished() {
            return Err(GameError::GameAlreadyOver);
        }
        self.finish(GameOutcome::win(!color, GameOverReason::Resignation));
        Ok(())
    }

    /// Records an outstanding draw offer. The offer lapses as soon as any
    /// ban or move is accepted.
    pub fn offer_draw(&mut self, color: Color) -> Result<(), GameError> {
        if self.outcome.is_finished() {
            return Err(GameError::GameAlreadyOver);
        }
        self.draw_offer = Some(color);
        Ok(())
    }

    /// Draw acceptance is authoritative like resignation; the offer
    /// handshake itself is the caller's concern.
    pub fn accept_draw(&mut self) -> Result<(), GameError> {
        if self.outcome.is_finished() {
            return Err(GameError::GameAlreadyOver);
        }
        self.finish(GameOutcome::draw(GameOverReason::DrawAgreement));
        Ok(())
    }

    pub fn decline_draw(&mut self) -> Result<(), GameError> {
        if self.outcome.is_finished() {
            return Err(GameError::GameAlreadyOver);
        }
        self.draw_offer = None;
        Ok(())
    }

    /// Clock expiry forces the game over regardless of phase. Idempotent: a
    /// second flag after the game has ended is a no-op, not an error.
    pub fn flag_timeout(&mut self, color: Color) -> Result<(), GameError> {
        if self.outcome.is_finished() {
            return Ok(());
        }
        self.finish(GameOutcome::win(!color, GameOverReason::Timeout));
        Ok(())
    }

    /// Full reset to a fresh game, the only way out of `GameOver`. Clears
    /// the position, the ban, both history logs and any draw offer.
    pub fn reset(&mut self) {
        let logger = self.logger.clone();
        *self = BanChessGame::with_logger(logger);
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn banned_move(&self) -> Option<BannedMove> {
        self.banned
    }

    pub fn draw_offer(&self) -> Option<Color> {
        self.draw_offer
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    /// The banner is always the opponent of the side to move.
    pub fn side_to_ban(&self) -> Color {
        !self.position.side_to_move()
    }

    pub fn turn_number(&self) -> u32 {
        self.position.fullmove_number()
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The square pairs the current banner may choose from: the legal moves
    /// of the side to move. Empty outside `AwaitingBan`.
    pub fn legal_ban_targets(&self) -> Vec<(Square, Square)> {
        if self.phase != Phase::AwaitingBan {
            return Vec::new();
        }
        self.position.legal_pairs()
    }

    /// The square pairs the side to move may actually play: the legal moves
    /// minus the banned pair. Empty outside `AwaitingMove`.
    pub fn legal_moves_excluding_ban(&self) -> Vec<(Square, Square)> {
        if self.phase != Phase::AwaitingMove {
            return Vec::new();
        }
        let banned = self.banned.map(|b| b.pair());
        self.position.legal_pairs()
            .into_iter()
            .filter(|&pair| Some(pair) != banned)
            .collect()
    }

    pub fn history(&self) -> &[GameEvent] {
        self.ledger.events()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn linearize(&self) -> Vec<TurnEntry> {
        self.ledger.linearize()
    }

    pub fn move_text(&self) -> String {
        self.ledger.move_text()
    }

    pub fn reconstruct_at(&self, index: usize) -> Result<Position, GameError> {
        self.ledger.reconstruct_at(index)
    }

    /// Public state snapshot for consumers (UI, persistence), with squares
    /// and colors as plain strings.
    pub fn state(&self) -> GameState {
        GameState {
            fen: self.fen(),
            phase: self.phase,
            banned_move: self.banned.map(BanEntry::from),
            turn_number: self.turn_number(),
            side_to_move: color_name(self.side_to_move()).to_string(),
            side_to_ban: color_name(self.side_to_ban()).to_string(),
            outcome: self.outcome,
            draw_offer: self.draw_offer.map(|c| color_name(c).to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Optimistic prediction support
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.position.clone(),
            phase: self.phase,
            banned: self.banned,
            outcome: self.outcome,
            draw_offer: self.draw_offer,
            ledger_len: self.ledger.len(),
        }
    }

    /// Restores a snapshot atomically, discarding any events predicted
    /// since it was taken.
    pub fn rollback(&mut self, snapshot: Snapshot) {
        self.position = snapshot.position;
        self.phase = snapshot.phase;
        self.banned = snapshot.banned;
        self.outcome = snapshot.outcome;
        self.draw_offer = snapshot.draw_offer;
        self.ledger.truncate(snapshot.ledger_len);
    }

}

impl Default for BanChessGame {
    fn default() -> Self {
        BanChessGame::new()
    }
}

/// Everything a consumer needs to render the game, JSON-serializable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub fen: String,
    pub phase: Phase,
    pub banned_move: Option<BanEntry>,
    pub turn_number: u32,
    pub side_to_move: String,
    pub side_to_ban: String,
    pub outcome: GameOutcome,
    pub draw_offer: Option<String>,
}
