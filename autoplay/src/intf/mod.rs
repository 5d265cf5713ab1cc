pub mod score;

pub use score::{Bound, BoundedScore, Score, ScoreKind};

use anyhow::Result;
use autoplay_base::{Color, Piece, Sq, UciMove};
use std::time::Duration;
use thiserror::Error;

/// One principal variation reported by the engine for the requested depth.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RankedLine {
    pub rank: u32,
    pub depth: u32,
    /// Relative to White.
    pub score: Score,
    pub mv: UciMove,
}

impl RankedLine {
    #[inline]
    pub fn promote(&self) -> Option<Piece> {
        self.mv.promote
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Marking {
    pub src: Sq,
    pub dst: Sq,
    pub color: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub src: Sq,
    pub dst: Sq,
    pub promote: Option<Piece>,
    pub animate: bool,
    pub user_generated: bool,
}

impl From<UciMove> for MoveRequest {
    fn from(mv: UciMove) -> Self {
        MoveRequest {
            src: mv.src,
            dst: mv.dst,
            promote: mv.promote,
            animate: false,
            user_generated: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub mv: UciMove,
    pub kind: ScoreKind,
    pub delay: Duration,
}

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("board is not available")]
pub struct Unavailable;

/// Chess board widget the moves are read from and played on.
pub trait Board {
    /// Current position encoding, `None` if there is no board right now.
    fn position(&self) -> Option<String>;
    /// Color of the local player, `None` if unknown (e.g. analysis board).
    fn playing_as(&self) -> Option<Color>;

    fn add_marking(&mut self, m: &Marking) -> Result<(), Unavailable>;
    fn remove_marking(&mut self, m: &Marking) -> Result<(), Unavailable>;
    fn clear_markings(&mut self) -> Result<(), Unavailable>;

    fn play(&mut self, req: &MoveRequest) -> Result<(), Unavailable>;
}

/// Place where new games are started after the current one is over.
pub trait Lobby {
    /// `None` if there is no board, otherwise whether its game is over.
    fn game_over(&self) -> Option<bool>;
    fn path(&self) -> String;
    fn request_new_game(&mut self) -> Result<()>;
}

/// Surface the settings are read from and the computed move is shown on.
pub trait Panel {
    fn settings(&self) -> crate::config::Settings;
    fn report(&mut self, r: &Report);
}
