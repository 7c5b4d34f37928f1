use chess::{Color, Piece, Square};

use super::*;
use crate::error::GameError;
use crate::position::parse_square;

fn sq(name: &str) -> Square {
    parse_square(name).unwrap()
}

fn ban(game: &mut BanChessGame, from: &str, to: &str, color: Color) {
    game.ban(sq(from), sq(to), color).unwrap();
}

fn mv(game: &mut BanChessGame, from: &str, to: &str, color: Color) {
    game.make_move(sq(from), sq(to), None, color).unwrap();
}

// White is in check from the g8 rook and Kg1-h1 is the only legal move:
// f1 is covered by the b5 bishop, g2 stays on the rook's file, and the
// f2/h2 pawns block the remaining king squares.
const ONE_ESCAPE_FEN: &str = "k5r1/8/8/1b6/8/8/5P1P/6K1 w - - 0 1";

#[test]
fn initial_state() {
    let game = BanChessGame::new();
    assert_eq!(game.phase(), Phase::AwaitingBan);
    assert_eq!(game.side_to_move(), Color::White);
    assert_eq!(game.side_to_ban(), Color::Black);
    assert_eq!(game.turn_number(), 1);
    assert_eq!(game.banned_move(), None);
    assert_eq!(game.outcome(), GameOutcome::Active);
    assert!(game.history().is_empty());
}

#[test]
fn opening_ban_then_move() {
    let mut game = BanChessGame::new();

    let banned = game.ban(sq("e2"), sq("e4"), Color::Black).unwrap();
    assert_eq!(banned.pair(), (sq("e2"), sq("e4")));
    assert_eq!(banned.banned_by, Color::Black);
    assert_eq!(game.phase(), Phase::AwaitingMove);
    assert_eq!(game.side_to_move(), Color::White);

    let record = game.make_move(sq("d2"), sq("d4"), None, Color::White).unwrap();
    assert_eq!(record.san, "d4");
    assert_eq!(record.turn_number, 1);
    assert_eq!(record.banned_this_turn, Some(banned));

    // The mover becomes the next banner and the side to move flips
    assert_eq!(game.phase(), Phase::AwaitingBan);
    assert_eq!(game.side_to_move(), Color::Black);
    assert_eq!(game.side_to_ban(), Color::White);
    assert_eq!(game.banned_move(), None);
    assert_eq!(game.outcome(), GameOutcome::Active);
}

#[test]
fn banning_a_piece_of_the_banners_own_side_is_rejected() {
    let mut game = BanChessGame::new();
    ban(&mut game, "e2", "e4", Color::Black);
    mv(&mut game, "d2", "d4", Color::White);

    // White now bans one of Black's moves; a White-piece move is no
    // longer a legal ban target
    assert_eq!(
        game.ban(sq("d4"), sq("d5"), Color::White),
        Err(GameError::IllegalBanTarget)
    );
    ban(&mut game, "e7", "e5", Color::White);
}

#[test]
fn ban_preconditions() {
    let mut game = BanChessGame::new();

    // Black bans first, not White
    assert_eq!(
        game.ban(sq("e2"), sq("e4"), Color::White),
        Err(GameError::WrongPlayer)
    );
    // Not a legal move of the side to move
    assert_eq!(
        game.ban(sq("e2"), sq("e5"), Color::Black),
        Err(GameError::IllegalBanTarget)
    );
    assert_eq!(
        game.ban(sq("e2"), sq("e2"), Color::Black),
        Err(GameError::IllegalBanTarget)
    );

    ban(&mut game, "e2", "e4", Color::Black);
    // Only one ban per turn
    assert_eq!(
        game.ban(sq("d2"), sq("d4"), Color::Black),
        Err(GameError::WrongPhase)
    );
}

#[test]
fn move_during_awaiting_ban_leaves_state_untouched() {
    let mut game = BanChessGame::new();
    let fen = game.fen();
    let events = game.history().len();

    assert_eq!(
        game.make_move(sq("e2"), sq("e4"), None, Color::White),
        Err(GameError::WrongPhase)
    );
    assert_eq!(game.fen(), fen);
    assert_eq!(game.history().len(), events);
    assert_eq!(game.banned_move(), None);
    assert_eq!(game.phase(), Phase::AwaitingBan);
}

#[test]
fn move_by_the_wrong_player_is_rejected() {
    let mut game = BanChessGame::new();
    ban(&mut game, "e2", "e4", Color::Black);
    assert_eq!(
        game.make_move(sq("e7"), sq("e5"), None, Color::Black),
        Err(GameError::WrongPlayer)
    );
}

#[test]
fn banned_pair_is_rejected_for_every_promotion_piece() {
    let mut game = BanChessGame::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    ban(&mut game, "a7", "a8", Color::Black);

    for promotion in [
        None,
        Some(Piece::Queen),
        Some(Piece::Rook),
        Some(Piece::Bishop),
        Some(Piece::Knight),
    ] {
        assert_eq!(
            game.make_move(sq("a7"), sq("a8"), promotion, Color::White),
            Err(GameError::MoveIsBanned)
        );
    }
    assert_eq!(game.phase(), Phase::AwaitingMove);

    mv(&mut game, "e1", "e2", Color::White);
    assert_eq!(game.outcome(), GameOutcome::Active);
}

#[test]
fn promotion_move_is_recorded_with_san() {
    let mut game = BanChessGame::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    ban(&mut game, "e1", "e2", Color::Black);

    // A backrank pawn move without a promotion piece is not a move at all
    assert_eq!(
        game.make_move(sq("a7"), sq("a8"), None, Color::White),
        Err(GameError::IllegalMove)
    );

    let record = game
        .make_move(sq("a7"), sq("a8"), Some(Piece::Queen), Color::White)
        .unwrap();
    assert_eq!(record.san, "a8=Q+");
    assert_eq!(record.promotion, Some(Piece::Queen));
}

#[test]
fn banning_the_single_escape_while_in_check_is_checkmate() {
    let mut game = BanChessGame::from_fen(ONE_ESCAPE_FEN).unwrap();
    assert_eq!(game.legal_ban_targets(), vec![(sq("g1"), sq("h1"))]);

    game.ban(sq("g1"), sq("h1"), Color::Black).unwrap();
    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::BlackWins,
            reason: GameOverReason::Checkmate,
        }
    );
    assert_eq!(game.banned_move(), None);
}

#[test]
fn banning_one_of_several_escapes_is_not_checkmate() {
    // As ONE_ESCAPE_FEN but without the f2 pawn, so Kf2 is a second escape
    let mut game = BanChessGame::from_fen("k5r1/8/8/1b6/8/8/7P/6K1 w - - 0 1").unwrap();

    game.ban(sq("g1"), sq("h1"), Color::Black).unwrap();
    assert_eq!(game.phase(), Phase::AwaitingMove);
    assert_eq!(game.outcome(), GameOutcome::Active);
    assert_eq!(game.legal_moves_excluding_ban(), vec![(sq("g1"), sq("f2"))]);
}

#[test]
fn banning_the_only_move_while_not_in_check_is_not_stalemate() {
    // White is not in check and a2-a3 is the only legal move: the king is
    // boxed in by its own pawn and the black king, and the a4 pawn stops
    // the double push
    let mut game = BanChessGame::from_fen("8/8/8/8/p7/8/P1k5/K7 w - - 0 1").unwrap();
    assert_eq!(game.legal_ban_targets(), vec![(sq("a2"), sq("a3"))]);

    game.ban(sq("a2"), sq("a3"), Color::Black).unwrap();

    // Stalemate detection is deferred to the move attempt; the game stays
    // open with an empty move set for the caller to adjudicate
    assert_eq!(game.phase(), Phase::AwaitingMove);
    assert_eq!(game.outcome(), GameOutcome::Active);
    assert!(game.legal_moves_excluding_ban().is_empty());
    assert_eq!(
        game.make_move(sq("a2"), sq("a3"), None, Color::White),
        Err(GameError::MoveIsBanned)
    );
    assert_eq!(
        game.make_move(sq("a1"), sq("b1"), None, Color::White),
        Err(GameError::IllegalMove)
    );
}

#[test]
fn standard_checkmate_after_a_move_still_ends_the_game() {
    let mut game = BanChessGame::new();

    // Fool's mate, with unrelated bans before every move
    ban(&mut game, "a2", "a3", Color::Black);
    mv(&mut game, "f2", "f3", Color::White);
    ban(&mut game, "a7", "a6", Color::White);
    mv(&mut game, "e7", "e5", Color::Black);
    ban(&mut game, "b2", "b3", Color::Black);
    mv(&mut game, "g2", "g4", Color::White);
    ban(&mut game, "b7", "b6", Color::White);
    mv(&mut game, "d8", "h4", Color::Black);

    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::BlackWins,
            reason: GameOverReason::Checkmate,
        }
    );
    assert_eq!(
        game.ban(sq("e2"), sq("e3"), Color::Black),
        Err(GameError::GameAlreadyOver)
    );
}

#[test]
fn stalemate_after_a_move_is_a_draw() {
    let mut game = BanChessGame::from_fen("7k/8/4Q3/8/8/8/8/K7 w - - 0 1").unwrap();
    ban(&mut game, "e6", "e7", Color::Black);
    mv(&mut game, "e6", "g6", Color::White);

    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::Draw,
            reason: GameOverReason::Stalemate,
        }
    );
}

#[test]
fn insufficient_material_after_a_capture_is_a_draw() {
    let mut game = BanChessGame::from_fen("4k3/8/8/8/8/8/3r4/3K4 w - - 0 1").unwrap();
    ban(&mut game, "d1", "e1", Color::Black);
    mv(&mut game, "d1", "d2", Color::White);

    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::Draw,
            reason: GameOverReason::InsufficientMaterial,
        }
    );
}

#[test]
fn fifty_move_rule_draw() {
    let mut game = BanChessGame::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 99 80").unwrap();
    ban(&mut game, "h1", "g1", Color::Black);
    mv(&mut game, "h1", "h2", Color::White);

    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::Draw,
            reason: GameOverReason::FiftyMoveRule,
        }
    );
}

#[test]
fn threefold_repetition_draw() {
    let mut game = BanChessGame::new();

    let shuffle = [
        ("g1", "f3", Color::White),
        ("g8", "f6", Color::Black),
        ("f3", "g1", Color::White),
        ("f6", "g8", Color::Black),
    ];
    for cycle in 0..2 {
        for &(from, to, color) in &shuffle {
            let ban_pair = if color == Color::White {
                ("h2", "h3")
            } else {
                ("h7", "h6")
            };
            ban(&mut game, ban_pair.0, ban_pair.1, !color);
            mv(&mut game, from, to, color);

            let last = cycle == 1 && from == "f6";
            assert_eq!(game.outcome().is_finished(), last);
        }
    }

    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::Draw,
            reason: GameOverReason::ThreefoldRepetition,
        }
    );
}

#[test]
fn banned_move_exists_exactly_during_awaiting_move() {
    let mut game = BanChessGame::new();
    let plies = [
        ("e2", "e4", "d2", "d4", Color::White),
        ("e7", "e5", "d7", "d5", Color::Black),
        ("c2", "c4", "g1", "f3", Color::White),
    ];
    for &(ban_from, ban_to, from, to, color) in &plies {
        assert_eq!(game.phase(), Phase::AwaitingBan);
        assert!(game.banned_move().is_none());

        ban(&mut game, ban_from, ban_to, !color);
        assert_eq!(game.phase(), Phase::AwaitingMove);
        assert!(game.banned_move().is_some());

        mv(&mut game, from, to, color);
        assert!(game.banned_move().is_none());
    }
}

#[test]
fn replay_reconstructs_every_intermediate_position() {
    let mut game = BanChessGame::new();
    let initial_fen = game.fen();

    ban(&mut game, "e2", "e4", Color::Black);
    mv(&mut game, "d2", "d4", Color::White);
    ban(&mut game, "e7", "e5", Color::White);
    mv(&mut game, "d7", "d5", Color::Black);
    ban(&mut game, "c1", "f4", Color::Black);
    mv(&mut game, "g1", "f3", Color::White);

    let len = game.history().len();
    assert_eq!(game.reconstruct_at(0).unwrap().fen(), initial_fen);
    assert_eq!(game.reconstruct_at(len).unwrap().fen(), game.fen());
    // Replay is pure: running it twice gives the same answer
    assert_eq!(
        game.reconstruct_at(len).unwrap().fen(),
        game.reconstruct_at(len).unwrap().fen()
    );
    assert_eq!(
        game.reconstruct_at(len + 1).unwrap_err(),
        GameError::HistoryIndex(len + 1)
    );

    let replayed = BanChessGame::replay(game.history()).unwrap();
    assert_eq!(replayed.fen(), game.fen());
    assert_eq!(replayed.outcome(), game.outcome());
    assert_eq!(replayed.phase(), game.phase());
}

#[test]
fn linearize_pairs_bans_with_moves() {
    let mut game = BanChessGame::new();
    ban(&mut game, "e2", "e4", Color::Black);
    mv(&mut game, "d2", "d4", Color::White);
    ban(&mut game, "e7", "e5", Color::White);
    mv(&mut game, "d7", "d5", Color::Black);
    ban(&mut game, "b1", "c3", Color::Black);

    let entries = game.linearize();
    assert_eq!(entries.len(), 3);

    assert_eq!(entries[0].turn_number, 1);
    assert_eq!(entries[0].color, "white");
    let first_ban = entries[0].ban.as_ref().unwrap();
    assert_eq!((first_ban.from.as_str(), first_ban.to.as_str()), ("e2", "e4"));
    assert_eq!(first_ban.by_color, "black");
    assert_eq!(entries[0].mv.as_ref().unwrap().san, "d4");
    assert_eq!(entries[0].fen_after, game.reconstruct_at(2).unwrap().fen());

    // The trailing ban has no move yet
    assert_eq!(entries[2].turn_number, 2);
    assert_eq!(entries[2].color, "white");
    assert!(entries[2].mv.is_none());

    assert_eq!(
        game.move_text(),
        "1. {banning: e2e4} d4 {banning: e7e5} d5 2. {banning: b1c3} .."
    );
}

#[test]
fn state_serializes_to_json() {
    let mut game = BanChessGame::new();
    ban(&mut game, "e2", "e4", Color::Black);

    let state = game.state();
    assert_eq!(state.phase, Phase::AwaitingMove);
    assert_eq!(state.side_to_move, "white");
    assert_eq!(state.side_to_ban, "black");

    let json = serde_json::to_string(&state).unwrap();
    let back: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, state);
    assert!(json.contains("\"banned_move\""));
}

#[test]
fn resignation_ends_the_game_for_the_opponent() {
    let mut game = BanChessGame::new();
    game.resign(Color::White).unwrap();

    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::BlackWins,
            reason: GameOverReason::Resignation,
        }
    );
    assert_eq!(game.resign(Color::Black), Err(GameError::GameAlreadyOver));
    assert_eq!(
        game.ban(sq("e2"), sq("e4"), Color::Black),
        Err(GameError::GameAlreadyOver)
    );
}

#[test]
fn timeout_is_idempotent() {
    let mut game = BanChessGame::new();
    game.flag_timeout(Color::Black).unwrap();
    let outcome = game.outcome();
    assert_eq!(
        outcome,
        GameOutcome::Finished {
            result: GameResult::WhiteWins,
            reason: GameOverReason::Timeout,
        }
    );

    // A late second flag changes nothing and is not an error
    game.flag_timeout(Color::White).unwrap();
    assert_eq!(game.outcome(), outcome);
}

#[test]
fn draw_offer_lifecycle() {
    let mut game = BanChessGame::new();

    game.offer_draw(Color::White).unwrap();
    assert_eq!(game.draw_offer(), Some(Color::White));
    game.decline_draw().unwrap();
    assert_eq!(game.draw_offer(), None);
    assert_eq!(game.outcome(), GameOutcome::Active);

    // An offer lapses once play continues
    game.offer_draw(Color::Black).unwrap();
    ban(&mut game, "e2", "e4", Color::Black);
    assert_eq!(game.draw_offer(), None);

    game.accept_draw().unwrap();
    assert_eq!(
        game.outcome(),
        GameOutcome::Finished {
            result: GameResult::Draw,
            reason: GameOverReason::DrawAgreement,
        }
    );
    assert_eq!(game.offer_draw(Color::White), Err(GameError::GameAlreadyOver));
}

#[test]
fn snapshot_rollback_restores_the_predicted_state() {
    let mut game = BanChessGame::new();
    ban(&mut game, "e2", "e4", Color::Black);
    let snapshot = game.snapshot();
    let fen = game.fen();
    let banned = game.banned_move();

    // Predict locally, then learn the server disagreed
    mv(&mut game, "d2", "d4", Color::White);
    ban(&mut game, "e7", "e5", Color::White);
    assert_ne!(game.fen(), fen);

    game.rollback(snapshot);
    assert_eq!(game.fen(), fen);
    assert_eq!(game.phase(), Phase::AwaitingMove);
    assert_eq!(game.banned_move(), banned);
    assert_eq!(game.history().len(), 1);
}

#[test]
fn reset_returns_to_the_initial_state() {
    let mut game = BanChessGame::new();
    ban(&mut game, "e2", "e4", Color::Black);
    mv(&mut game, "d2", "d4", Color::White);
    game.resign(Color::Black).unwrap();

    game.reset();
    assert_eq!(game.phase(), Phase::AwaitingBan);
    assert_eq!(game.outcome(), GameOutcome::Active);
    assert_eq!(game.banned_move(), None);
    assert!(game.history().is_empty());
    assert_eq!(game.fen(), BanChessGame::new().fen());
}
