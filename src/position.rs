
use std::str::FromStr;

use chess::{
    Board, BoardStatus, ChessMove, Color, File, MoveGen, Piece, Rank, Square, EMPTY
};

use crate::error::GameError;

/// A full board snapshot as seen by the rules engine.
///
/// Wraps a `chess::Board` together with the bookkeeping the `chess` crate
/// does not carry: the halfmove clock, the fullmove number, and the Zobrist
/// hashes seen since the last irreversible move (for repetition detection).
/// The board itself is only ever mutated through [`Position::apply`].
#[derive(Clone, Debug)]
pub struct Position {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    seen_hashes: Vec<u64>,
}

impl Position {

    /// The standard chess starting position.
    pub fn initial() -> Position {
        let board = Board::default();
        Position {
            seen_hashes: vec![board.get_hash()],
            board,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Loads a position from a six-field FEN string. The piece placement is
    /// validated by the chess engine; the move counters are kept here since
    /// the engine discards them.
    pub fn from_fen(fen: &str) -> Result<Position, GameError> {
        let board = Board::from_str(fen)
            .map_err(|_| GameError::InvalidFen(fen.to_string()))?;
        let mut counters = fen.split_whitespace().skip(4);
        let halfmove_clock = counters.next().and_then(|f| f.parse().ok()).unwrap_or(0);
        let fullmove_number = counters.next().and_then(|f| f.parse().ok()).unwrap_or(1);
        Ok(Position {
            seen_hashes: vec![board.get_hash()],
            board,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Serializes to FEN, substituting this position's own move counters for
    /// the placeholder ones the chess engine prints.
    pub fn fen(&self) -> String {
        let base = self.board.to_string();
        let fields: Vec<&str> = base.split_whitespace().collect();
        format!(
            "{} {} {} {} {} {}",
            fields[0], fields[1], fields[2], fields[3],
            self.halfmove_clock, self.fullmove_number
        )
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn in_check(&self) -> bool {
        *self.board.checkers() != EMPTY
    }

    pub fn status(&self) -> BoardStatus {
        self.board.status()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// How many times the current position (including side to move, castling
    /// rights and en passant) has occurred since the last irreversible move.
    pub fn repetition_count(&self) -> usize {
        let current = self.board.get_hash();
        self.seen_hashes.iter().filter(|&&h| h == current).count()
    }

    pub fn legal_moves(&self) -> Vec<ChessMove> {
        MoveGen::new_legal(&self.board).collect()
    }

    /// The distinct `(from, to)` square pairs among the legal moves.
    /// Promotion variants collapse to a single pair, which is also the
    /// granularity at which moves are banned.
    pub fn legal_pairs(&self) -> Vec<(Square, Square)> {
        let mut pairs = Vec::new();
        for m in MoveGen::new_legal(&self.board) {
            let pair = (m.get_source(), m.get_dest());
            if !pairs.contains(&pair) {
                pairs.push(pair);
            }
        }
        pairs
    }

    /// Resolves a `(from, to, promotion)` proposal to a legal move, or `None`
    /// if the chess engine rejects it (which includes a missing promotion
    /// piece on a backrank pawn move).
    pub fn find_move(
        &self, from: Square, to: Square, promotion: Option<Piece>
    ) -> Option<ChessMove> {
        let m = ChessMove::new(from, to, promotion);
        if self.board.legal(m) { Some(m) } else { None }
    }

    /// Applies a legal move, advancing the clocks and the repetition history.
    pub(crate) fn apply(&mut self, m: ChessMove) {
        assert!(self.board.legal(m), "apply called with an illegal move");

        let mover = self.board.side_to_move();
        let piece = self.board.piece_on(m.get_source());
        // A pawn changing file onto an empty square is an en passant capture
        let capture = self.board.piece_on(m.get_dest()).is_some()
            || (piece == Some(Piece::Pawn)
                && m.get_source().get_file() != m.get_dest().get_file());

        self.board = self.board.make_move_new(m);

        if capture || piece == Some(Piece::Pawn) {
            self.halfmove_clock = 0;
            self.seen_hashes.clear();
        } else {
            self.halfmove_clock += 1;
        }
        if mover == Color::Black {
            self.fullmove_number += 1;
        }
        self.seen_hashes.push(self.board.get_hash());
    }

    /// Dead-position detection: king vs king, king and one minor piece vs
    /// king, or king and bishop each with the bishops on same-colored squares.
    pub fn insufficient_material(&self) -> bool {
        let heavy = *self.board.pieces(Piece::Pawn)
            | *self.board.pieces(Piece::Rook)
            | *self.board.pieces(Piece::Queen);
        if heavy != EMPTY { return false; }

        let knights = *self.board.pieces(Piece::Knight);
        let bishops = *self.board.pieces(Piece::Bishop);
        match (knights.popcnt(), bishops.popcnt()) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (0, 2) => {
                let one_each =
                    (bishops & *self.board.color_combined(Color::White)).popcnt() == 1;
                let mut shades = bishops.map(square_shade);
                one_each && shades.next() == shades.next()
            }
            _ => false,
        }
    }

    /// Renders a legal move in standard algebraic notation, with minimal
    /// disambiguation and check/checkmate marks. The chess engine has no SAN
    /// writer of its own.
    pub fn san(&self, m: ChessMove) -> String {
        assert!(self.board.legal(m), "san called with an illegal move");

        let piece = self.board.piece_on(m.get_source())
            .expect("a legal move has a piece on its source square");
        let from = m.get_source();
        let to = m.get_dest();

        let after = self.board.make_move_new(m);
        let suffix = match after.status() {
            BoardStatus::Checkmate => "#",
            _ if *after.checkers() != EMPTY => "+",
            _ => "",
        };

        // Castling renders from the king's two-square travel
        if piece == Piece::King && from.get_file() == File::E {
            if to.get_file() == File::G {
                return format!("O-O{}", suffix);
            }
            if to.get_file() == File::C {
                return format!("O-O-O{}", suffix);
            }
        }

        let capture = self.board.piece_on(to).is_some()
            || (piece == Piece::Pawn && from.get_file() != to.get_file());

        let mut san = String::new();
        if piece == Piece::Pawn {
            if capture {
                san.push(file_char(from.get_file()));
            }
        } else {
            san.push(piece_letter(piece));
            san.push_str(&self.disambiguation(m, piece));
        }
        if capture {
            san.push('x');
        }
        san.push_str(&to.to_string());
        if let Some(p) = m.get_promotion() {
            san.push('=');
            san.push(piece_letter(p));
        }
        san.push_str(suffix);
        san
    }

    fn disambiguation(&self, m: ChessMove, piece: Piece) -> String {
        let from = m.get_source();
        let rivals: Vec<Square> = MoveGen::new_legal(&self.board)
            .filter(|o| {
                o.get_source() != from
                    && o.get_dest() == m.get_dest()
                    && self.board.piece_on(o.get_source()) == Some(piece)
            })
            .map(|o| o.get_source())
            .collect();

        if rivals.is_empty() {
            String::new()
        } else if !rivals.iter().any(|s| s.get_file() == from.get_file()) {
            file_char(from.get_file()).to_string()
        } else if !rivals.iter().any(|s| s.get_rank() == from.get_rank()) {
            rank_char(from.get_rank()).to_string()
        } else {
            from.to_string()
        }
    }

}

/// Parses a square name like `"e4"`.
pub fn parse_square(name: &str) -> Option<Square> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 { return None; }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return None;
    }
    Some(Square::make_square(
        Rank::from_index((rank - b'1') as usize),
        File::from_index((file - b'a') as usize),
    ))
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(file: File) -> char {
    (b'a' + file.to_index() as u8) as char
}

fn rank_char(rank: Rank) -> char {
    (b'1' + rank.to_index() as u8) as char
}

fn square_shade(sq: Square) -> usize {
    (sq.get_rank().to_index() + sq.get_file().to_index()) % 2
}
