//! Board sandbox for single-piece practice
//!
//! A practice position usually lacks one or both kings, which no rules engine accepts. The
//! sandbox keeps a full position with anchor kings for the engine, and shows the learner the
//! same position with the anchors filtered out. After each practice move, it gives the move
//! back to the learner and rebuilds the anchors, so the learner never faces a reply.

use crate::engine::{EngineError, RulesEngine};
use crate::error::Result;
use crate::ledger::{self, MovePair};
use crate::owl::OwlEngine;
use crate::proposal::{Attempt, MoveProposal, Playable, Rejection};
use crate::session::{GameSession, GameStatus, LastMove};
use crate::tutorial::TutorialDefinition;

use zoochess_base::anchor::{self, AnchorError, Anchored, Anchors};
use zoochess_base::position;
use zoochess_base::{Color, Piece, PieceKind, Position, Square, SquareSet};

use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SandboxState {
    /// No tutorial is loaded
    Idle,
    /// The base position of a tutorial is loaded, no moves are made yet
    Initialized,
    /// A move is being made
    AwaitingMove,
    /// A move was made and the anchors were rebuilt
    Resynced,
}

/// Practice board for one tutorial at a time
#[derive(Debug, Clone)]
pub struct Sandbox<E: RulesEngine = OwlEngine> {
    learner: Color,
    state: SandboxState,
    tutorial: Option<&'static TutorialDefinition>,
    session: Option<GameSession<E>>,
    anchors: Anchors,
    prev_anchors: Vec<Anchors>,
    visible: Position,
}

const BOTH: [Color; 2] = [Color::White, Color::Black];

fn accepted_by<E: RulesEngine>(position: &Position) -> bool {
    E::from_position(position).is_ok()
}

impl<E: RulesEngine> Sandbox<E> {
    /// Creates an idle sandbox in which `learner` is the side practicing
    pub fn new(learner: Color) -> Self {
        Sandbox {
            learner,
            state: SandboxState::Idle,
            tutorial: None,
            session: None,
            anchors: Anchors::NONE,
            prev_anchors: Vec::new(),
            visible: Position::empty(),
        }
    }

    pub fn learner(&self) -> Color {
        self.learner
    }

    pub fn state(&self) -> SandboxState {
        self.state
    }

    pub fn tutorial(&self) -> Option<&'static TutorialDefinition> {
        self.tutorial
    }

    /// Squares currently holding anchor kings
    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    /// Full position, as seen by the rules engine
    pub fn engine_position(&self) -> Option<&Position> {
        self.session.as_ref().map(GameSession::position)
    }

    /// Position as shown to the learner, without anchors
    pub fn visible_position(&self) -> &Position {
        &self.visible
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.session.as_ref().and_then(GameSession::last_move)
    }

    /// Practice moves, one per row
    pub fn history_pairs(&self) -> Vec<MovePair> {
        self.session
            .as_ref()
            .map(|s| ledger::practice_pairs(s.move_log()))
            .unwrap_or_default()
    }

    /// Loads the base position of `tutorial`
    ///
    /// When Black is practicing, the base position is mirrored so that the practice piece is
    /// Black. Kings already present in the base position count as anchors, except for the
    /// learner's king in a king tutorial. If the rules engine refuses them where they stand,
    /// they are placed again like any other anchor. On failure, the sandbox is left unchanged.
    pub fn select(&mut self, tutorial: &'static TutorialDefinition) -> Result<()> {
        let base = tutorial.base_position_for(self.learner)?.with_side(self.learner);

        let mut anchors = Anchors::NONE;
        for color in BOTH {
            if tutorial.piece == PieceKind::King && color == self.learner {
                continue;
            }
            let kings = base.board.squares_of(Piece::king(color));
            if let (1, Some(sq)) = (kings.len(), kings.iter().next()) {
                anchors.set(color, sq);
            }
        }

        let position = match anchor::ensure_anchors_by(&base, &BOTH, accepted_by::<E>) {
            Ok(anchored) => {
                anchors.merge(anchored.anchors);
                anchored.position
            }
            Err(e) if anchors.is_empty() => return Err(e.into()),
            Err(_) => {
                let stripped = anchor::strip_anchors(&base, &anchors)?;
                let anchored = anchor::ensure_anchors_by(&stripped, &BOTH, accepted_by::<E>)?;
                anchors = anchored.anchors;
                anchored.position
            }
        };
        let session = GameSession::with_position(&position)?;

        debug!(tutorial = tutorial.id, anchors = %anchors.squares(), "sandbox initialized");
        self.visible = anchor::visible(session.position(), &anchors);
        self.tutorial = Some(tutorial);
        self.session = Some(session);
        self.anchors = anchors;
        self.prev_anchors.clear();
        self.state = SandboxState::Initialized;
        Ok(())
    }

    /// Reloads the base position of the current tutorial
    ///
    /// Does nothing if no tutorial is loaded.
    pub fn reset(&mut self) -> Result<()> {
        match self.tutorial {
            Some(tutorial) => self.select(tutorial),
            None => Ok(()),
        }
    }

    /// Unloads the tutorial
    pub fn close(&mut self) {
        *self = Self::new(self.learner);
    }

    /// Takes back the last practice move, restoring its anchors
    pub fn undo(&mut self) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        if !session.undo() {
            return false;
        }
        if let Some(anchors) = self.prev_anchors.pop() {
            self.anchors = anchors;
        }
        self.visible = anchor::visible(session.position(), &self.anchors);
        self.state = if session.move_log().is_empty() {
            SandboxState::Initialized
        } else {
            SandboxState::Resynced
        };
        debug!(state = ?self.state, "practice move taken back");
        true
    }

    /// Removes the anchors from `position`
    ///
    /// An anchor square taken over by another piece is dropped from the record and skipped.
    fn strip(&self, position: &Position) -> Result<Position, AnchorError> {
        let mut anchors = self.anchors;
        loop {
            match anchor::strip_anchors(position, &anchors) {
                Ok(stripped) => return Ok(stripped),
                Err(AnchorError::InconsistentSandbox { square, found }) => {
                    trace!(%square, %found, "anchor square taken over, skipping");
                    anchors.forget(square);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Builds the next engine position after the learner's move
    fn resync(&self, moved: &Position) -> Result<Anchored> {
        let forced = Position {
            en_passant: None,
            ..position::force_side_to_move(moved, self.learner)
        };
        let stripped = self.strip(&forced)?;
        let anchored = anchor::ensure_anchors_by(&stripped, &BOTH, accepted_by::<E>)?;
        Ok(anchored)
    }

    fn is_anchor(&self, sq: Square) -> bool {
        self.anchors.squares().has(sq)
    }

    /// Moves the anchors after an accepted move and puts the result into `session`
    fn resync_session(&self, session: &mut GameSession<E>) -> Result<Anchored> {
        let next = self.resync(session.position())?;
        session.rebase(&next.position)?;
        Ok(next)
    }

    /// Makes the move on a copy of the session, which replaces the current one only if the
    /// anchors were rebuilt
    fn practice_move(&mut self, proposal: MoveProposal) -> Attempt {
        let Some(current) = &self.session else {
            return Attempt::Rejected(Rejection::Inactive);
        };
        if self.is_anchor(proposal.from) {
            return Attempt::Rejected(Rejection::Illegal(EngineError::IllegalMove(proposal)));
        }
        let mut session = current.clone();
        let prior = self.state;
        self.state = SandboxState::AwaitingMove;

        let attempt = match session.make_move(proposal) {
            Attempt::Accepted(_) => match self.resync_session(&mut session) {
                Ok(next) => {
                    self.prev_anchors.push(self.anchors);
                    self.anchors = next.anchors;
                    self.visible = anchor::visible(session.position(), &next.anchors);
                    self.session = Some(session);
                    self.state = SandboxState::Resynced;
                    debug!(
                        %proposal,
                        anchors = %self.anchors.squares(),
                        position = %self.visible,
                        "sandbox resynced"
                    );
                    return Attempt::Accepted(GameStatus::Normal);
                }
                Err(e) => {
                    debug!(%proposal, error = %e, "cannot resync sandbox, move rejected");
                    Attempt::Rejected(Rejection::Resync(e))
                }
            },
            rejected => rejected,
        };
        self.state = prior;
        attempt
    }
}

impl<E: RulesEngine> Playable for Sandbox<E> {
    fn position(&self) -> &Position {
        &self.visible
    }

    fn legal_destinations(&self, from: Square) -> SquareSet {
        match &self.session {
            Some(session) if !self.is_anchor(from) => session.legal_destinations(from),
            _ => SquareSet::EMPTY,
        }
    }

    /// Makes a practice move
    ///
    /// Status is always [`GameStatus::Normal`], as single-sided practice has no result.
    fn play(&mut self, proposal: MoveProposal) -> Attempt {
        self.practice_move(proposal)
    }
}
