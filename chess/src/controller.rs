//! UI controller
//!
//! The controller is the only thing the presentation layer talks to. It takes [`Event`]s
//! produced by user gestures and buttons, and after each of them publishes a [`Frame`] with
//! everything that has to be rendered.

use crate::config::Config;
use crate::error::Result;
use crate::ledger::MovePair;
use crate::proposal::{Attempt, MovePipeline, MoveProposal, Rejection};
use crate::sandbox::Sandbox;
use crate::session::{GameSession, GameStatus, LastMove};
use crate::share;
use crate::tutorial::{self, TutorialDefinition};

use zoochess_base::{Color, Position, Square, SquareSet};

use serde::Serialize;
use tracing::{debug, warn};

use std::time::{Duration, Instant};

pub const WELCOME: &str = "Welcome! Drag the white pieces to start.";
pub const NEW_GAME: &str = "New Game! White starts.";
pub const ILLEGAL_MOVE: &str = "Oops! You can't move there.";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Game,
    Tutorial,
}

/// Input from the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A piece was picked up
    SourceSelected(Square),
    /// The piece was released outside of the board
    DragCancelled,
    /// The piece was dropped on a square
    Propose(MoveProposal),
    UndoRequested,
    ResetRequested,
    /// Switch to the tutorial with the given id
    TutorialSelected(String),
    /// Switch to tutorial mode, keeping the loaded tutorial if there is one
    TutorialModeSelected,
    /// Switch back to the full game
    GameSelected,
}

/// Everything the presentation layer needs to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub mode: Mode,
    /// Position to show, in FEN, without anchor kings
    pub fen: String,
    pub status: GameStatus,
    pub message: String,
    pub history: Vec<MovePair>,
    /// Legal destinations of the piece being dragged
    pub highlights: Vec<String>,
    pub last_move: Option<[String; 2]>,
    pub tutorial: Option<&'static TutorialDefinition>,
}

impl Frame {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone)]
struct Flash {
    text: &'static str,
    until: Instant,
}

fn squares(set: SquareSet) -> Vec<String> {
    set.iter().map(|sq| sq.to_string()).collect()
}

/// Status line, as shown when there is no other message
pub fn status_text(status: GameStatus, side: Color) -> String {
    match status {
        GameStatus::Checkmate => format!("Checkmate! {} wins!", side.inv().name()),
        GameStatus::Draw => "It's a draw!".to_string(),
        GameStatus::Check => "Check! Watch out!".to_string(),
        GameStatus::Normal => format!("{}'s turn", side.name()),
    }
}

/// Owner of the game session, the practice sandbox and the gesture in progress
#[derive(Debug)]
pub struct Controller {
    config: Config,
    start: Position,
    mode: Mode,
    game: GameSession,
    sandbox: Sandbox,
    pipeline: MovePipeline,
    message: String,
    flash: Option<Flash>,
}

impl Controller {
    /// Creates a controller in game mode, starting from the configured position
    pub fn new(config: Config) -> Result<Controller> {
        let start = config.start_position()?;
        let game = GameSession::with_position(&start)?;
        Ok(Controller {
            sandbox: Sandbox::new(config.learner()),
            config,
            start,
            mode: Mode::Game,
            game,
            pipeline: MovePipeline::new(),
            message: WELCOME.to_string(),
            flash: None,
        })
    }

    /// Creates a controller for a page loaded with `query`
    ///
    /// If the query has a `fen` parameter, the game starts from the shared position. A shared
    /// position which cannot be parsed or played is ignored.
    pub fn from_query(config: Config, query: &str) -> Result<Controller> {
        let mut controller = Controller::new(config)?;
        let shared = match share::position_from_query(query) {
            None => return Ok(controller),
            Some(Ok(position)) => position,
            Some(Err(e)) => {
                warn!(query, error = %e, "ignoring malformed shared position");
                return Ok(controller);
            }
        };
        match GameSession::with_position(&shared) {
            Ok(game) => {
                debug!(fen = %shared, "loaded shared position");
                controller.game = game;
            }
            Err(e) => warn!(fen = %shared, error = %e, "ignoring unplayable shared position"),
        }
        Ok(controller)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn game(&self) -> &GameSession {
        &self.game
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Link which opens the current game position
    pub fn share_link(&self, base: &str) -> String {
        share::share_link(base, self.game.position())
    }

    pub fn handle(&mut self, event: Event) -> Frame {
        self.handle_at(event, Instant::now())
    }

    /// Applies `event` at time `now`, returning the frame to render
    pub fn handle_at(&mut self, event: Event, now: Instant) -> Frame {
        self.tick(now);
        match event {
            Event::SourceSelected(sq) => {
                match self.mode {
                    Mode::Game => self.pipeline.propose_source(&self.game, sq),
                    Mode::Tutorial => self.pipeline.propose_source(&self.sandbox, sq),
                };
            }
            Event::DragCancelled => self.pipeline.cancel(),
            Event::Propose(proposal) => self.propose(proposal, now),
            Event::UndoRequested => {
                self.pipeline.cancel();
                let undone = match self.mode {
                    Mode::Game => self.game.undo(),
                    Mode::Tutorial => self.sandbox.undo(),
                };
                if undone {
                    self.update_status();
                }
            }
            Event::ResetRequested => {
                self.pipeline.cancel();
                self.reset();
            }
            Event::TutorialSelected(id) => {
                self.pipeline.cancel();
                self.select_tutorial(&id);
            }
            Event::TutorialModeSelected => {
                self.pipeline.cancel();
                match self.sandbox.tutorial() {
                    Some(_) => {
                        self.mode = Mode::Tutorial;
                        self.update_status();
                    }
                    None => {
                        let id = self.config.default_tutorial.clone();
                        self.select_tutorial(&id);
                    }
                }
            }
            Event::GameSelected => {
                self.pipeline.cancel();
                self.mode = Mode::Game;
                self.update_status();
            }
        }
        self.frame()
    }

    /// Expires the illegal move notice if its time has passed
    ///
    /// Returns `true` if the message changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.flash {
            Some(flash) if now >= flash.until => {
                self.flash = None;
                self.update_status();
                true
            }
            _ => false,
        }
    }

    /// Time left until the illegal move notice expires
    pub fn notice_left(&self, now: Instant) -> Option<Duration> {
        self.flash
            .as_ref()
            .map(|flash| flash.until.saturating_duration_since(now))
    }

    fn propose(&mut self, proposal: MoveProposal, now: Instant) {
        let res = match self.mode {
            Mode::Game => self.pipeline.attempt(&mut self.game, proposal),
            Mode::Tutorial => self.pipeline.attempt(&mut self.sandbox, proposal),
        };
        match res {
            Attempt::Accepted(_) => {
                self.flash = None;
                self.update_status();
            }
            Attempt::Rejected(Rejection::SameSquare | Rejection::Inactive) => {}
            Attempt::Rejected(reason) => {
                debug!(%proposal, %reason, "showing illegal move notice");
                self.flash = Some(Flash {
                    text: ILLEGAL_MOVE,
                    until: now + self.config.notice_timeout(),
                });
            }
        }
    }

    fn reset(&mut self) {
        match self.mode {
            Mode::Game => match self.game.reset(Some(&self.start)) {
                Ok(()) => {
                    self.flash = None;
                    self.message = NEW_GAME.to_string();
                }
                Err(e) => warn!(error = %e, "cannot reset game"),
            },
            Mode::Tutorial => match self.sandbox.reset() {
                Ok(()) => self.update_status(),
                Err(e) => warn!(error = %e, "cannot reset tutorial"),
            },
        }
    }

    fn select_tutorial(&mut self, id: &str) {
        let res = tutorial::lookup(id).and_then(|t| self.sandbox.select(t));
        match res {
            Ok(()) => {
                self.mode = Mode::Tutorial;
                self.flash = None;
                self.update_status();
            }
            Err(e) => warn!(id, error = %e, "cannot select tutorial"),
        }
    }

    fn update_status(&mut self) {
        self.message = match self.mode {
            Mode::Game => status_text(self.game.status(), self.game.position().side),
            Mode::Tutorial => {
                status_text(GameStatus::Normal, self.sandbox.visible_position().side)
            }
        };
    }

    /// Builds the frame for the current state
    pub fn frame(&self) -> Frame {
        let (position, status, history, last_move, tutorial) = match self.mode {
            Mode::Game => (
                self.game.position(),
                self.game.status(),
                self.game.history_pairs(),
                self.game.last_move(),
                None,
            ),
            Mode::Tutorial => (
                self.sandbox.visible_position(),
                GameStatus::Normal,
                self.sandbox.history_pairs(),
                self.sandbox.last_move(),
                self.sandbox.tutorial(),
            ),
        };
        let message = match &self.flash {
            Some(flash) => flash.text.to_string(),
            None => self.message.clone(),
        };
        Frame {
            mode: self.mode,
            fen: position.as_fen(),
            status,
            message,
            history,
            highlights: squares(self.pipeline.highlights()),
            last_move: last_move.map(|LastMove { from, to }| [from.to_string(), to.to_string()]),
            tutorial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use zoochess_base::INITIAL_FEN;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(s: &str) -> Event {
        Event::Propose(s.parse().unwrap())
    }

    fn controller() -> Controller {
        Controller::new(Config::default()).unwrap()
    }

    #[test]
    fn test_welcome() {
        let c = controller();
        let frame = c.frame();
        assert_eq!(frame.mode, Mode::Game);
        assert_eq!(frame.fen, INITIAL_FEN);
        assert_eq!(frame.message, WELCOME);
        assert!(frame.history.is_empty());
        assert!(frame.highlights.is_empty());
        assert_eq!(frame.last_move, None);
        assert_eq!(frame.tutorial, None);
    }

    #[test]
    fn test_move_flow() {
        let mut c = controller();
        let frame = c.handle(Event::SourceSelected(sq("e2")));
        assert_eq!(frame.highlights, ["e4", "e3"]);

        let frame = c.handle(mv("e2e4"));
        assert!(frame.highlights.is_empty());
        assert_eq!(frame.message, "Black's turn");
        assert_eq!(frame.last_move, Some(["e2".to_string(), "e4".to_string()]));
        assert_eq!(frame.history.len(), 1);

        let frame = c.handle(Event::UndoRequested);
        assert_eq!(frame.fen, INITIAL_FEN);
        assert_eq!(frame.message, "White's turn");

        c.handle(mv("e2e4"));
        c.handle(Event::SourceSelected(sq("e7")));
        let frame = c.handle(Event::DragCancelled);
        assert!(frame.highlights.is_empty());
    }

    #[test]
    fn test_illegal_notice_expires() {
        let mut c = controller();
        let t0 = Instant::now();
        let frame = c.handle_at(mv("e2e5"), t0);
        assert_eq!(frame.message, ILLEGAL_MOVE);
        assert_eq!(frame.fen, INITIAL_FEN);
        assert_eq!(c.notice_left(t0), Some(Duration::from_millis(2000)));

        assert!(!c.tick(t0 + Duration::from_millis(1999)));
        assert_eq!(c.frame().message, ILLEGAL_MOVE);
        assert!(c.tick(t0 + Duration::from_millis(2000)));
        assert_eq!(c.frame().message, "White's turn");
        assert_eq!(c.notice_left(t0), None);

        // Dropping a piece back on its square is not worth a notice
        let frame = c.handle_at(mv("e2e2"), t0);
        assert_eq!(frame.message, "White's turn");
    }

    #[test]
    fn test_status_messages() {
        let mut c = controller();
        for m in ["f2f3", "e7e5", "g2g4"] {
            c.handle(mv(m));
        }
        let frame = c.handle(mv("d8h4"));
        assert_eq!(frame.status, GameStatus::Checkmate);
        assert_eq!(frame.message, "Checkmate! Black wins!");

        let frame = c.handle(Event::ResetRequested);
        assert_eq!(frame.message, NEW_GAME);
        assert_eq!(frame.fen, INITIAL_FEN);
        assert!(frame.history.is_empty());
    }

    #[test]
    fn test_from_query() {
        let c = Controller::from_query(Config::default(), "?fen=garbage").unwrap();
        assert_eq!(c.frame().fen, INITIAL_FEN);

        let c = Controller::from_query(Config::default(), "").unwrap();
        assert_eq!(c.frame().fen, INITIAL_FEN);

        // Parses, but has no kings
        let kingless = share::encode(&Position::from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1").unwrap());
        let c = Controller::from_query(Config::default(), &format!("fen={}", kingless)).unwrap();
        assert_eq!(c.frame().fen, INITIAL_FEN);

        let pos = Position::from_fen("7k/8/8/8/2Q5/8/8/K7 w - - 0 1").unwrap();
        let link = controller().share_link("https://zoo.example/");
        assert!(link.ends_with(&share::encode(&Position::initial())));
        let query = format!("?fen={}", share::encode(&pos));
        let mut c = Controller::from_query(Config::default(), &query).unwrap();
        assert_eq!(c.frame().fen, pos.as_fen());
        let frame = c.handle(mv("c4c8"));
        assert_eq!(frame.history.len(), 1);
        assert_eq!(frame.status, GameStatus::Check);
        assert_eq!(frame.message, "Check! Watch out!");
    }

    #[test]
    fn test_tutorial_mode() {
        let mut c = controller();
        c.handle(mv("d2d4"));

        let frame = c.handle(Event::TutorialModeSelected);
        assert_eq!(frame.mode, Mode::Tutorial);
        assert_eq!(frame.tutorial.map(|t| t.id), Some("p"));
        assert_eq!(frame.fen, "8/8/8/8/8/8/4P3/8 w - - 0 1");
        assert!(frame.history.is_empty());

        let frame = c.handle(Event::TutorialSelected("q".to_string()));
        assert_eq!(frame.tutorial.map(|t| t.title), Some("Queen"));
        assert_eq!(frame.fen, "8/8/8/8/3Q4/8/8/8 w - - 0 1");

        let frame = c.handle(mv("d4d7"));
        assert_eq!(frame.message, "White's turn");
        assert_eq!(frame.status, GameStatus::Normal);
        assert_eq!(frame.fen.split(' ').next(), Some("8/3Q4/8/8/8/8/8/8"));

        let frame = c.handle(Event::TutorialSelected("nope".to_string()));
        assert_eq!(frame.tutorial.map(|t| t.id), Some("q"));

        let frame = c.handle(Event::GameSelected);
        assert_eq!(frame.mode, Mode::Game);
        assert_eq!(frame.history.len(), 1);
        assert_eq!(frame.message, "Black's turn");

        let frame = c.handle(Event::TutorialModeSelected);
        assert_eq!(frame.tutorial.map(|t| t.id), Some("q"));
        assert_eq!(frame.history.len(), 1);

        let frame = c.handle(Event::ResetRequested);
        assert_eq!(frame.fen, "8/8/8/8/3Q4/8/8/8 w - - 0 1");
        assert!(frame.history.is_empty());
    }

    #[test]
    fn test_black_learner_tutorial() {
        let config = Config::from_json(r#"{"learner": "black", "default_tutorial": "r"}"#).unwrap();
        let mut c = Controller::new(config).unwrap();
        let frame = c.handle(Event::TutorialModeSelected);
        assert_eq!(frame.fen, "8/8/8/3r4/8/8/8/8 b - - 0 1");
        assert_eq!(frame.message, "Black's turn");
        assert_eq!(c.handle(Event::SourceSelected(sq("d5"))).highlights.len(), 14);

        let frame = c.handle(mv("d5d1"));
        assert_eq!(frame.fen, "8/8/8/8/8/8/8/3r4 b - - 0 1");
        assert_eq!(frame.message, "Black's turn");
        assert_eq!(Ledger(&frame.history).to_string(), "1. Rd1");

        // The game itself still starts with White
        let frame = c.handle(Event::GameSelected);
        assert_eq!(frame.fen, INITIAL_FEN);
    }

    #[test]
    fn test_json() {
        let json = controller().frame().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "game");
        assert_eq!(value["status"], "normal");
        assert_eq!(value["fen"], INITIAL_FEN);
        assert!(value["last_move"].is_null());
    }
}
