
use chess::{Color, Piece, Square};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::position::Position;

/// A move the opponent has forbidden for the upcoming move attempt.
///
/// At most one exists at a time. It targets a `(from, to)` square pair, so
/// banning a promotion forbids every promotion piece at once.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BannedMove {
    pub from: Square,
    pub to: Square,
    pub banned_by: Color,
    pub at_turn: u32,
}

impl BannedMove {
    pub fn pair(&self) -> (Square, Square) {
        (self.from, self.to)
    }

    /// Coordinate form, e.g. `"e2e4"`.
    pub fn uci(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

/// An accepted move, recorded immutably once applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub san: String,
    pub fen_after: String,
    pub turn_number: u32,
    pub color: Color,
    /// The ban that was in force when this move was chosen, kept for
    /// historical display after the live ban has been cleared.
    pub banned_this_turn: Option<BannedMove>,
}

/// One entry in the interleaved ban/move log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Ban(BannedMove),
    Move(MoveRecord),
}

/// Append-only log of everything that happened in a game, together with the
/// position it started from. Any intermediate position can be rebuilt by pure
/// replay.
#[derive(Clone, Debug)]
pub struct Ledger {
    start: Position,
    events: Vec<GameEvent>,
}

impl Ledger {

    pub fn new(start: Position) -> Ledger {
        Ledger { start, events: Vec::new() }
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn append(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Discards locally predicted events beyond `len` when an authoritative
    /// log disagrees. Confirmed entries are never touched.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Replays the ledger from the starting position through the first
    /// `index` events. Index 0 is the starting position itself; the full
    /// length is the live position. Bans do not touch the board, so only
    /// move events are applied.
    pub fn reconstruct_at(&self, index: usize) -> Result<Position, GameError> {
        if index > self.events.len() {
            return Err(GameError::HistoryIndex(index));
        }
        let mut position = self.start.clone();
        for event in &self.events[..index] {
            if let GameEvent::Move(record) = event {
                let m = position
                    .find_move(record.from, record.to, record.promotion)
                    .ok_or_else(|| GameError::CorruptHistory(
                        format!("{}{}", record.from, record.to)
                    ))?;
                position.apply(m);
            }
        }
        Ok(position)
    }

    /// Collapses the event log into per-ply turn entries: each accepted move
    /// paired with the ban that constrained it, plus a trailing entry for a
    /// ban whose move has not been played yet.
    pub fn linearize(&self) -> Vec<TurnEntry> {
        let mut entries = Vec::new();
        let mut pending: Option<BannedMove> = None;
        let mut last_fen = self.start.fen();

        for event in &self.events {
            match event {
                GameEvent::Ban(ban) => pending = Some(*ban),
                GameEvent::Move(record) => {
                    entries.push(TurnEntry {
                        turn_number: record.turn_number,
                        color: color_name(record.color).to_string(),
                        ban: pending.take().map(BanEntry::from),
                        mv: Some(MoveEntry::from(record)),
                        fen_after: record.fen_after.clone(),
                    });
                    last_fen = record.fen_after.clone();
                }
            }
        }

        if let Some(ban) = pending {
            entries.push(TurnEntry {
                turn_number: ban.at_turn,
                color: color_name(!ban.banned_by).to_string(),
                ban: Some(BanEntry::from(ban)),
                mv: None,
                fen_after: last_fen,
            });
        }
        entries
    }

    /// Numbered SAN move text with each turn's ban embedded as a comment
    /// token, e.g. `1. {banning: e2e4} d4 {banning: d7d5} Nf3`.
    pub fn move_text(&self) -> String {
        let mut text = String::new();
        for entry in self.linearize() {
            if !text.is_empty() {
                text.push(' ');
            }
            if entry.color == "white" {
                text.push_str(&format!("{}. ", entry.turn_number));
            }
            if let Some(ban) = &entry.ban {
                text.push_str(&format!("{{banning: {}{}}} ", ban.from, ban.to));
            }
            match &entry.mv {
                Some(mv) => text.push_str(&mv.san),
                None => text.push_str(".."),
            }
        }
        text
    }

}

/// Serialized form of a turn: plain strings so the format is readable by
/// standard notation tooling without this crate's types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEntry {
    pub turn_number: u32,
    pub color: String,
    pub ban: Option<BanEntry>,
    #[serde(rename = "move")]
    pub mv: Option<MoveEntry>,
    pub fen_after: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub from: String,
    pub to: String,
    pub by_color: String,
}

impl From<BannedMove> for BanEntry {
    fn from(ban: BannedMove) -> BanEntry {
        BanEntry {
            from: ban.from.to_string(),
            to: ban.to.to_string(),
            by_color: color_name(ban.banned_by).to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
    pub san: String,
}

impl From<&MoveRecord> for MoveEntry {
    fn from(record: &MoveRecord) -> MoveEntry {
        MoveEntry {
            from: record.from.to_string(),
            to: record.to.to_string(),
            promotion: record.promotion.map(|p| piece_name(p).to_string()),
            san: record.san.clone(),
        }
    }
}

pub(crate) fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn piece_name(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}
