//! Analysis session on top of a UCI engine.
//!
//! The engine handles one search at a time, so the session keeps at most one
//! active request. Starting a new request supersedes the previous one: the
//! engine is told to stop, and the `bestmove` it still owes for the stopped
//! search is swallowed together with any `info` lines sent before it. Each
//! request is identified by a [`Ticket`], so callers can tell a late outcome
//! from the one they are waiting for.

use crate::intf::RankedLine;
use crate::uci::{Command, Event, Info, Link, Message, Opts, parse_msg, sanitize};
use anyhow::{Context, Result, bail};
use autoplay_base::{Color, Fen, UciMove};
use derive_more::Display;
use std::{
    collections::HashSet,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[display("#{_0}")]
pub struct Ticket(u64);

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("engine did not finish within {0:?}")]
    Timeout(Duration),
    #[error("engine connection closed")]
    Disconnected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub ticket: Ticket,
    pub result: Result<Vec<RankedLine>, EvalError>,
}

struct Request {
    ticket: Ticket,
    depth: u32,
    side: Color,
    infos: Vec<Info>,
    /// `None` if the timeout reaches past what `Instant` can hold.
    deadline: Option<Instant>,
}

impl Request {
    fn resolve(self, best: Option<UciMove>) -> Outcome {
        let lines = collect_lines(&self.infos, self.depth, self.side, best);
        debug!(ticket = %self.ticket, lines = lines.len(), "analysis finished");
        Outcome {
            ticket: self.ticket,
            result: Ok(lines),
        }
    }

    fn fail(self, err: EvalError) -> Outcome {
        Outcome {
            ticket: self.ticket,
            result: Err(err),
        }
    }
}

/// Builds the ranked result from the `info` records of one search.
///
/// Records are scanned newest first, so for each rank the latest update at
/// the requested depth wins. Records missing any of rank, score or move are
/// dropped. The engine's final move lends its promotion piece only to the
/// line going between the same squares.
fn collect_lines(
    infos: &[Info],
    depth: u32,
    side: Color,
    best: Option<UciMove>,
) -> Vec<RankedLine> {
    let mut seen = HashSet::new();
    let mut lines: Vec<RankedLine> = infos
        .iter()
        .rev()
        .filter(|i| i.depth == Some(depth))
        .filter_map(|i| {
            Some(RankedLine {
                rank: i.multipv?,
                depth,
                score: i.score?.score.for_white(side),
                mv: i.pv?,
            })
        })
        .filter(|l| seen.insert(l.rank))
        .collect();
    lines.sort_by_key(|l| l.rank);

    if let Some(best) = best.filter(|b| b.promote.is_some()) {
        for line in lines
            .iter_mut()
            .filter(|l| l.mv.promote.is_none() && l.mv.same_squares(&best))
        {
            line.mv = line.mv.with_promote(best.promote);
        }
    }
    lines
}

pub struct EngineSession {
    link: Link,
    timeout: Duration,
    last_ticket: u64,
    active: Option<Request>,
    owed_bestmoves: usize,
}

impl EngineSession {
    /// Performs the handshake and applies `opts`. Does not wait for `uciok`:
    /// engines queue commands, and nothing is searched before `start`.
    pub fn new(mut link: Link, opts: &Opts, timeout: Duration) -> Result<Self> {
        sanitize::opts(opts).context("checking engine options")?;
        link.send(&Command::Uci)?;
        for (name, value) in opts.iter() {
            link.send(&Command::SetOption { name, value })?;
        }
        Ok(EngineSession {
            link,
            timeout,
            last_ticket: 0,
            active: None,
            owed_bestmoves: 0,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Starts analysing `fen` to `depth`, superseding the active request.
    pub fn start(&mut self, fen: &Fen, depth: u32, now: Instant) -> Result<Ticket> {
        if self.link.is_closed() {
            bail!("engine connection closed");
        }
        // The old request stays active until `stop` is out, so a failed write
        // leaves it to settle by timeout or disconnect.
        if let Some(old) = self.active.as_ref().map(|r| r.ticket) {
            self.link.send(&Command::Stop)?;
            debug!(ticket = %old, "superseding analysis");
            self.active = None;
            self.owed_bestmoves += 1;
        }
        self.last_ticket += 1;
        let ticket = Ticket(self.last_ticket);
        self.link.send(&Command::Position(fen))?;
        self.link.send(&Command::Go { depth })?;
        debug!(%ticket, depth, position = fen.as_str(), "analysis started");
        self.active = Some(Request {
            ticket,
            depth,
            side: fen.side(),
            infos: Vec::new(),
            deadline: now.checked_add(self.timeout),
        });
        Ok(ticket)
    }

    /// Consumes the engine output received so far. Returns the outcome of the
    /// active request once it is settled.
    pub fn poll(&mut self, now: Instant) -> Option<Outcome> {
        while let Some(event) = self.link.try_next() {
            if let Some(outcome) = self.handle(event) {
                return Some(outcome);
            }
        }
        self.check_deadline(now)
    }

    /// Analyses `fen` and waits for the result.
    pub fn evaluate(&mut self, fen: &Fen, depth: u32) -> Result<Vec<RankedLine>> {
        let ticket = self.start(fen, depth, Instant::now())?;
        loop {
            let deadline = match &self.active {
                Some(req) => req.deadline,
                None => bail!("analysis {} vanished", ticket),
            };
            let wait = match deadline {
                Some(d) => d.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            let outcome = match self.link.next_timeout(wait) {
                Some(event) => self.handle(event),
                None => self.check_deadline(Instant::now()),
            };
            if let Some(outcome) = outcome {
                return Ok(outcome.result?);
            }
        }
    }

    /// Asks the engine to exit. Errors are only logged, as this is called on
    /// teardown.
    pub fn shutdown(&mut self) {
        if self.link.is_closed() {
            return;
        }
        if let Err(e) = self.link.send(&Command::Quit) {
            warn!(error = %e, "could not stop the engine");
        }
    }

    fn handle(&mut self, event: Event) -> Option<Outcome> {
        match event {
            Event::Line(ln) => self.handle_line(&ln),
            Event::Failure(msg) => {
                warn!(msg = msg.as_str(), "engine failure");
                None
            }
            Event::Closed => {
                warn!("engine connection closed");
                self.owed_bestmoves = 0;
                Some(self.active.take()?.fail(EvalError::Disconnected))
            }
        }
    }

    fn handle_line(&mut self, ln: &str) -> Option<Outcome> {
        let msg = match parse_msg(ln) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(line = ln, error = %e, "skipping malformed engine output");
                return None;
            }
        };
        match msg {
            Message::Id(name) => {
                info!(name = name.as_str(), "engine identified");
                None
            }
            Message::BestMove(_) if self.owed_bestmoves > 0 => {
                self.owed_bestmoves -= 1;
                debug!("dropping stale bestmove");
                None
            }
            Message::BestMove(bm) => match self.active.take() {
                Some(req) => Some(req.resolve(bm.best)),
                None => {
                    debug!(line = ln, "bestmove without a request");
                    None
                }
            },
            Message::Info(_) if self.owed_bestmoves > 0 => None,
            // Depth 0 comes when there is nothing to search (mate or
            // stalemate on the board). The engine still sends a bestmove
            // afterwards, which then belongs to no request.
            Message::Info(info) if info.depth == Some(0) => {
                let req = self.active.take()?;
                self.owed_bestmoves += 1;
                Some(req.resolve(None))
            }
            Message::Info(info) => {
                self.active.as_mut()?.infos.push(info);
                None
            }
            Message::UciOk | Message::ReadyOk | Message::Other => None,
        }
    }

    fn check_deadline(&mut self, now: Instant) -> Option<Outcome> {
        let deadline = self.active.as_ref()?.deadline?;
        if now < deadline {
            return None;
        }
        let req = self.active.take()?;
        warn!(ticket = %req.ticket, timeout = ?self.timeout, "analysis timed out");
        match self.link.send(&Command::Stop) {
            Ok(()) => self.owed_bestmoves += 1,
            Err(e) => warn!(error = %e, "could not stop the search"),
        }
        Some(req.fail(EvalError::Timeout(self.timeout)))
    }
}
