
use wasm_bindgen::prelude::*;
use chess::{Color, File, Rank, Square, ALL_PIECES};
use js_sys::{Array, JsString};

use super::game::{BanChessGame, GameOutcome, GameResult, Phase};
use crate::error::GameError;

#[wasm_bindgen]
impl BanChessGame {

    pub fn js_new() -> BanChessGame {
        crate::utils::set_panic_hook();
        BanChessGame::new()
    }

    pub fn js_from_fen(fen: &str) -> Option<BanChessGame> {
        crate::utils::set_panic_hook();
        BanChessGame::from_fen(fen).ok()
    }

    /// Returns `None` on success and the rejection message otherwise.
    pub fn js_ban(&mut self,
        from_file: usize, from_rank: usize, to_file: usize, to_rank: usize,
        color: &str
    ) -> Option<JsString> {
        let color = match js_color(color) {
            Some(c) => c,
            None => return Some("unknown color".into()),
        };
        self.ban(square(from_file, from_rank), square(to_file, to_rank), color)
            .err()
            .map(error_string)
    }

    /// Returns `None` on success and the rejection message otherwise.
    pub fn js_move(&mut self,
        from_file: usize, from_rank: usize, to_file: usize, to_rank: usize,
        promotion: Option<usize>, color: &str
    ) -> Option<JsString> {
        let color = match js_color(color) {
            Some(c) => c,
            None => return Some("unknown color".into()),
        };
        self.make_move(
            square(from_file, from_rank),
            square(to_file, to_rank),
            promotion.map(|i| ALL_PIECES[i]),
            color,
        )
        .err()
        .map(error_string)
    }

    /// `[[from_file, from_rank, to_file, to_rank], ...]` the banner may
    /// choose from.
    pub fn js_legal_ban_targets(&self) -> Array {
        pairs_to_js(self.legal_ban_targets())
    }

    /// `[[from_file, from_rank, to_file, to_rank], ...]` the mover may
    /// actually play.
    pub fn js_legal_moves(&self) -> Array {
        pairs_to_js(self.legal_moves_excluding_ban())
    }

    pub fn js_phase(&self) -> JsString {
        match self.phase() {
            Phase::AwaitingBan => "awaiting ban".into(),
            Phase::AwaitingMove => "awaiting move".into(),
            Phase::GameOver => "game over".into(),
        }
    }

    pub fn js_side_to_move(&self) -> JsString {
        color_string(self.side_to_move())
    }

    pub fn js_side_to_ban(&self) -> JsString {
        color_string(self.side_to_ban())
    }

    /// The banned move in coordinate form (`"e2e4"`), if one is active.
    pub fn js_banned_move(&self) -> Option<JsString> {
        self.banned_move().map(|b| b.uci().into())
    }

    pub fn js_fen(&self) -> JsString {
        self.fen().into()
    }

    pub fn js_turn_number(&self) -> u32 {
        self.turn_number()
    }

    pub fn js_outcome(&self) -> JsString {
        match self.outcome() {
            GameOutcome::Active => "active".into(),
            GameOutcome::Finished { result: GameResult::WhiteWins, .. } =>
                "white".into(),
            GameOutcome::Finished { result: GameResult::BlackWins, .. } =>
                "black".into(),
            GameOutcome::Finished { result: GameResult::Draw, .. } =>
                "draw".into(),
        }
    }

    pub fn js_state_json(&self) -> JsString {
        serde_json::to_string(&self.state())
            .unwrap_or_else(|_| String::from("{}"))
            .into()
    }

    pub fn js_history_json(&self) -> JsString {
        serde_json::to_string(&self.linearize())
            .unwrap_or_else(|_| String::from("[]"))
            .into()
    }

    pub fn js_move_text(&self) -> JsString {
        self.move_text().into()
    }

    pub fn js_resign(&mut self, color: &str) -> Option<JsString> {
        signal(js_color(color).map(|c| self.resign(c)))
    }

    pub fn js_offer_draw(&mut self, color: &str) -> Option<JsString> {
        signal(js_color(color).map(|c| self.offer_draw(c)))
    }

    pub fn js_accept_draw(&mut self) -> Option<JsString> {
        signal(Some(self.accept_draw()))
    }

    pub fn js_decline_draw(&mut self) -> Option<JsString> {
        signal(Some(self.decline_draw()))
    }

    pub fn js_flag_timeout(&mut self, color: &str) -> Option<JsString> {
        signal(js_color(color).map(|c| self.flag_timeout(c)))
    }

    pub fn js_reset(&mut self) {
        self.reset();
    }
}

fn square(file: usize, rank: usize) -> Square {
    Square::make_square(Rank::from_index(rank), File::from_index(file))
}

fn js_color(name: &str) -> Option<Color> {
    match name {
        "white" => Some(Color::White),
        "black" => Some(Color::Black),
        _ => None,
    }
}

fn color_string(color: Color) -> JsString {
    match color {
        Color::White => "white".into(),
        Color::Black => "black".into(),
    }
}

fn error_string(error: GameError) -> JsString {
    error.to_string().into()
}

fn signal(result: Option<Result<(), GameError>>) -> Option<JsString> {
    match result {
        None => Some("unknown color".into()),
        Some(Err(e)) => Some(error_string(e)),
        Some(Ok(())) => None,
    }
}

fn pairs_to_js(pairs: Vec<(Square, Square)>) -> Array {
    let js_pairs = Array::new();
    for (from, to) in pairs {
        let js_pair = Array::new();
        js_pair.push(&from.get_file().to_index().into());
        js_pair.push(&from.get_rank().to_index().into());
        js_pair.push(&to.get_file().to_index().into());
        js_pair.push(&to.get_rank().to_index().into());
        js_pairs.push(&js_pair);
    }
    js_pairs
}
