//! Decision loop.
//!
//! Everything runs on the caller's thread: each [`Driver::tick`] polls the
//! engine session, plays or drops the pending move, and starts a new analysis
//! when the board shows a position not seen before.

mod delay;
mod marker;
mod stop;

pub use delay::DelayRange;
pub use marker::Marker;
pub use stop::{StopCallback, StopState};

use crate::analysis::{self, Classification};
use crate::config::Settings;
use crate::engine::{EngineSession, Outcome, Ticket};
use crate::intf::{Board, Lobby, MoveRequest, Panel, Report};
use crate::queue::AutoQueue;
use autoplay_base::Fen;
use rand::{SeedableRng, rngs::StdRng};
use std::{
    str::FromStr,
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

struct Analysis {
    ticket: Ticket,
    fen: Fen,
    /// As reported by the board, before any trimming.
    position: String,
    delay: Duration,
}

struct PendingMove {
    due: Instant,
    req: MoveRequest,
    position: String,
}

pub struct Driver<'a, B, L, P> {
    session: &'a mut EngineSession,
    board: B,
    lobby: L,
    panel: P,
    queue: AutoQueue,
    marker: Marker,
    rng: StdRng,
    last_seen: Option<String>,
    analysis: Option<Analysis>,
    pending: Option<PendingMove>,
}

impl<'a, B: Board, L: Lobby, P: Panel> Driver<'a, B, L, P> {
    pub fn new(session: &'a mut EngineSession, board: B, lobby: L, panel: P) -> Self {
        Self::with_rng(session, board, lobby, panel, StdRng::from_entropy())
    }

    pub fn with_rng(
        session: &'a mut EngineSession,
        board: B,
        lobby: L,
        panel: P,
        rng: StdRng,
    ) -> Self {
        Driver {
            session,
            board,
            lobby,
            panel,
            queue: AutoQueue::new(),
            marker: Marker::new(),
            rng,
            last_seen: None,
            analysis: None,
            pending: None,
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn last_seen(&self) -> Option<&str> {
        self.last_seen.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn has_pending_move(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs one cycle of the loop. Safe to call at any rate: a position that
    /// was already seen is never analysed twice in a row.
    pub fn tick(&mut self, now: Instant) {
        let settings = self.panel.settings();
        if settings.auto_queue {
            self.queue.join_game(&mut self.lobby);
        }
        if let Some(outcome) = self.session.poll(now) {
            self.on_outcome(outcome, &settings, now);
        }
        self.update_pending(&settings, now);
        self.check_position(&settings, now);
    }

    /// Ticks every `period` until `stop` fires. An analysis in flight at that
    /// moment is still waited for, so its result gets reported.
    pub fn run(&mut self, period: Duration, stop: &StopState) {
        info!(?period, "decision loop started");
        while !stop.is_stopped() || self.is_analyzing() {
            let start = Instant::now();
            self.tick(start);
            thread::sleep(period.saturating_sub(start.elapsed()));
        }
        info!("decision loop stopped");
    }

    fn on_outcome(&mut self, outcome: Outcome, settings: &Settings, now: Instant) {
        let analysis = match self.analysis.take() {
            Some(a) if a.ticket == outcome.ticket => a,
            other => {
                debug!(ticket = %outcome.ticket, "dropping outcome of a superseded analysis");
                self.analysis = other;
                return;
            }
        };
        let lines = match outcome.result {
            Ok(lines) => lines,
            Err(e) => {
                warn!(ticket = %outcome.ticket, error = %e, "analysis failed");
                return;
            }
        };

        for line in &lines {
            let class = analysis::classify(Some(&line.score)).unwrap_or(Classification::Book);
            info!(
                rank = line.rank,
                mv = %line.mv,
                score = %line.score,
                %class,
                "calculated move"
            );
            if settings.marking {
                let side = analysis.fen.side();
                if let Err(e) = self.marker.mark(&mut self.board, side, &line.mv, class) {
                    debug!(error = %e, "could not mark the move");
                }
            }
        }

        let Some(top) = lines.first() else {
            debug!(ticket = %outcome.ticket, "no lines at the requested depth");
            return;
        };
        self.panel.report(&Report {
            mv: top.mv,
            kind: top.score.kind(),
            delay: analysis.delay,
        });
        if !settings.auto_move {
            return;
        }
        let Some(due) = now.checked_add(analysis.delay) else {
            warn!(delay = ?analysis.delay, "delay out of range, move not scheduled");
            return;
        };
        debug!(mv = %top.mv, delay = ?analysis.delay, "move scheduled");
        self.pending = Some(PendingMove {
            due,
            req: MoveRequest::from(top.mv),
            position: analysis.position,
        });
    }

    fn update_pending(&mut self, settings: &Settings, now: Instant) {
        let Some(pending) = &self.pending else {
            return;
        };
        if !settings.auto_move {
            debug!("auto-move disabled, dropping the scheduled move");
            self.pending = None;
            return;
        }
        if self.board.position().as_deref() != Some(pending.position.as_str()) {
            debug!("position changed, dropping the scheduled move");
            self.pending = None;
            return;
        }
        if now < pending.due {
            return;
        }
        let req = pending.req;
        self.pending = None;
        match self.board.play(&req) {
            Ok(()) => info!(src = %req.src, dst = %req.dst, "move played"),
            Err(e) => warn!(error = %e, "could not play the move"),
        }
    }

    fn check_position(&mut self, settings: &Settings, now: Instant) {
        let Some(position) = self.board.position() else {
            return;
        };
        if self.last_seen.as_deref() == Some(position.as_str()) {
            return;
        }
        self.last_seen = Some(position.clone());
        if self.pending.take().is_some() {
            debug!("position changed, dropping the scheduled move");
        }

        let fen = match Fen::from_str(&position) {
            Ok(fen) => fen,
            Err(e) => {
                warn!(position = position.as_str(), error = %e, "board reported a bad position");
                return;
            }
        };
        let delay = settings.delay().sample(&mut self.rng);
        let old = self.analysis.take();
        match self.session.start(&fen, settings.depth(), now) {
            Ok(ticket) => {
                if let Some(old) = old {
                    debug!(ticket = %old.ticket, "analysis superseded");
                }
                self.analysis = Some(Analysis {
                    ticket,
                    fen,
                    position,
                    delay,
                });
            }
            // Whatever the session still holds for the old request is of no
            // interest anymore; its outcome gets dropped on arrival.
            Err(e) => warn!(error = %e, "could not start the analysis"),
        }
    }
}
