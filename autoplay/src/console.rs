//! Terminal stand-ins for the board, lobby and panel.
//!
//! Positions are read one per line from an input stream; everything the loop
//! would do to a real board is printed instead.

use crate::config::Settings;
use crate::driver::StopState;
use crate::intf::{Board, Lobby, Marking, MoveRequest, Panel, Report, Unavailable};
use anyhow::{Context, Result};
use autoplay_base::{Color, UciMove};
use std::{
    io::{BufRead, Write},
    sync::{Arc, Mutex, PoisonError},
    thread,
};
use tracing::{debug, warn};

pub type Output = Arc<Mutex<dyn Write + Send>>;

fn print(out: &Output, args: std::fmt::Arguments<'_>) -> Result<(), Unavailable> {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    out.write_fmt(args)
        .and_then(|_| out.flush())
        .map_err(|_| Unavailable)
}

pub struct ConsoleBoard {
    position: Arc<Mutex<Option<String>>>,
    playing_as: Option<Color>,
    out: Output,
}

impl ConsoleBoard {
    /// Starts a thread that reads positions from `input`. The latest
    /// non-empty line is the current position. `stop` fires when the input
    /// ends.
    pub fn spawn(
        input: impl BufRead + Send + 'static,
        playing_as: Option<Color>,
        out: Output,
        stop: Arc<StopState>,
    ) -> Result<Self> {
        let position = Arc::new(Mutex::new(None));
        let latest = position.clone();
        thread::Builder::new()
            .name("board-input".into())
            .spawn(move || {
                for ln in input.lines() {
                    let ln = match ln {
                        Ok(ln) => ln,
                        Err(e) => {
                            warn!(error = %e, "reading positions");
                            break;
                        }
                    };
                    let ln = ln.trim();
                    if ln.is_empty() {
                        continue;
                    }
                    debug!(position = ln, "new position");
                    *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(ln.to_owned());
                }
                stop.stop();
            })
            .context("starting board reader")?;
        Ok(ConsoleBoard {
            position,
            playing_as,
            out,
        })
    }
}

impl Board for ConsoleBoard {
    fn position(&self) -> Option<String> {
        self.position
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn playing_as(&self) -> Option<Color> {
        self.playing_as
    }

    fn add_marking(&mut self, m: &Marking) -> Result<(), Unavailable> {
        print(&self.out, format_args!("mark {}{} {}\n", m.src, m.dst, m.color))
    }

    fn remove_marking(&mut self, m: &Marking) -> Result<(), Unavailable> {
        print(&self.out, format_args!("unmark {}{}\n", m.src, m.dst))
    }

    fn clear_markings(&mut self) -> Result<(), Unavailable> {
        print(&self.out, format_args!("unmark all\n"))
    }

    fn play(&mut self, req: &MoveRequest) -> Result<(), Unavailable> {
        let mv = UciMove::new(req.src, req.dst).with_promote(req.promote);
        print(&self.out, format_args!("play {}\n", mv))
    }
}

/// Lobby for a board that never offers new games.
pub struct NoLobby;

impl Lobby for NoLobby {
    fn game_over(&self) -> Option<bool> {
        None
    }

    fn path(&self) -> String {
        String::new()
    }

    fn request_new_game(&mut self) -> Result<()> {
        anyhow::bail!("no lobby to join a game from")
    }
}

pub struct ConsolePanel {
    settings: Settings,
    out: Output,
}

impl ConsolePanel {
    pub fn new(settings: Settings, out: Output) -> Self {
        ConsolePanel { settings, out }
    }
}

impl Panel for ConsolePanel {
    fn settings(&self) -> Settings {
        self.settings.clone()
    }

    fn report(&mut self, r: &Report) {
        let res = print(
            &self.out,
            format_args!("{} | {} | {}s\n", r.mv, r.kind, r.delay.as_secs()),
        );
        if res.is_err() {
            warn!("could not print the report");
        }
    }
}
