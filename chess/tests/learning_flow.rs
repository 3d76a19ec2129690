use zoochess::base::{Color, Piece, Position, Square};
use zoochess::controller::ILLEGAL_MOVE;
use zoochess::{share, Config, Controller, Event, GameStatus, Ledger, Mode};

use std::time::{Duration, Instant};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn mv(s: &str) -> Event {
    Event::Propose(s.parse().unwrap())
}

fn kings_shown(fen: &str) -> usize {
    let pos = Position::from_fen(fen).unwrap();
    let kings = pos.board.squares_of(Piece::king(Color::White))
        | pos.board.squares_of(Piece::king(Color::Black));
    kings.len() as usize
}

#[test]
fn test_scholars_mate() {
    let mut c = Controller::new(Config::default()).unwrap();
    for m in ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6"] {
        assert!(c.handle(mv(m)).message.ends_with("'s turn"));
    }
    let frame = c.handle(mv("h5f7"));
    assert_eq!(frame.status, GameStatus::Checkmate);
    assert_eq!(frame.message, "Checkmate! White wins!");
    assert_eq!(
        Ledger(&frame.history).to_string(),
        "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#"
    );

    // No moves after mate
    let frame = c.handle(Event::SourceSelected(sq("a7")));
    assert!(frame.highlights.is_empty());

    let frame = c.handle(Event::UndoRequested);
    assert_eq!(frame.status, GameStatus::Normal);
    assert_eq!(frame.history.len(), 3);
    assert_eq!(frame.last_move, Some(["g8".to_string(), "f6".to_string()]));
}

#[test]
fn test_shared_link_round_trip() {
    let mut c = Controller::new(Config::default()).unwrap();
    for m in ["d2d4", "d7d5", "c2c4"] {
        c.handle(mv(m));
    }
    let link = c.share_link("https://zoochess.example/");
    let query = &link[link.find('?').unwrap()..];

    let shared = Controller::from_query(Config::default(), query).unwrap();
    let frame = shared.frame();
    assert_eq!(frame.fen, c.game().position().as_fen());
    assert!(frame.history.is_empty());
    assert_eq!(frame.message, "Welcome! Drag the white pieces to start.");

    let garbage = Controller::from_query(Config::default(), "?fen=garbage").unwrap();
    assert_eq!(garbage.frame().fen, Position::initial().as_fen());
    assert_eq!(share::position_from_query("?fen=garbage").map(|r| r.is_err()), Some(true));
}

#[test]
fn test_pawn_practice() {
    let mut c = Controller::new(Config::default()).unwrap();
    let frame = c.handle(Event::TutorialSelected("p".to_string()));
    assert_eq!(frame.mode, Mode::Tutorial);
    assert_eq!(frame.fen, "8/8/8/8/8/8/4P3/8 w - - 0 1");

    let frame = c.handle(Event::SourceSelected(sq("e2")));
    assert_eq!(frame.highlights, ["e4", "e3"]);

    let mut fens = Vec::new();
    for m in ["e2e4", "e4e5", "e5e6", "e6e7", "e7e8"] {
        let frame = c.handle(mv(m));
        assert_eq!(frame.status, GameStatus::Normal, "{}", m);
        assert!(frame.fen.contains(" w "), "{}", frame.fen);
        assert_eq!(kings_shown(&frame.fen), 0, "{}", frame.fen);
        fens.push(frame.fen);
    }
    assert_eq!(fens.last().map(|f| f.split(' ').next()), Some(Some("4Q3/8/8/8/8/8/8/8")));
    assert_eq!(
        Ledger(&c.frame().history).to_string(),
        "1. e4 2. e5 3. e6 4. e7 5. e8=Q"
    );

    // The new queen keeps practicing
    assert!(!c.handle(Event::SourceSelected(sq("e8"))).highlights.is_empty());
    c.handle(Event::DragCancelled);

    let frame = c.handle(Event::UndoRequested);
    assert_eq!(frame.fen, fens[3]);
    assert_eq!(frame.history.len(), 4);
}

#[test]
fn test_king_practice_and_back() {
    let mut c = Controller::new(Config::default()).unwrap();
    c.handle(mv("e2e4"));

    let frame = c.handle(Event::TutorialSelected("k".to_string()));
    assert_eq!(kings_shown(&frame.fen), 1);
    for m in ["d4d5", "d5d6", "d6e7", "e7f8"] {
        let frame = c.handle(mv(m));
        assert_eq!(kings_shown(&frame.fen), 1, "{}", frame.fen);
        assert!(frame.fen.contains(" w "));
    }

    let t0 = Instant::now();
    let frame = c.handle_at(mv("f8f6"), t0);
    assert_eq!(frame.message, ILLEGAL_MOVE);
    assert_eq!(c.notice_left(t0), Some(Duration::from_secs(2)));
    c.tick(t0 + Duration::from_secs(2));
    assert_eq!(c.frame().message, "White's turn");

    let frame = c.handle(Event::GameSelected);
    assert_eq!(frame.mode, Mode::Game);
    assert_eq!(Ledger(&frame.history).to_string(), "1. e4");
    assert_eq!(frame.message, "Black's turn");
}
