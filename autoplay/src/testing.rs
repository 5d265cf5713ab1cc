//! In-memory engine and board used by the unit tests.

use crate::config::Settings;
use crate::intf::{Board, Marking, MoveRequest, Panel, Report, Unavailable};
use crate::uci::{Event, Link};
use autoplay_base::Color;
use std::{
    io::{self, Write},
    sync::{
        Arc, Mutex,
        mpsc::{self, Sender},
    },
};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct ScriptedEngine {
    input: SharedBuf,
    tx: Sender<Event>,
}

impl ScriptedEngine {
    pub fn emit(&self, ln: &str) {
        self.tx.send(Event::Line(ln.to_owned())).unwrap();
    }

    pub fn fail(&self, msg: &str) {
        self.tx.send(Event::Failure(msg.to_owned())).unwrap();
    }

    /// Commands received so far, one per line.
    pub fn sent(&self) -> Vec<String> {
        let buf = self.input.0.lock().unwrap();
        String::from_utf8_lossy(&buf)
            .lines()
            .map(str::to_owned)
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.sent().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

pub fn link() -> (Link, ScriptedEngine) {
    let input = SharedBuf::default();
    let (tx, rx) = mpsc::channel();
    let link = Link::new(Box::new(input.clone()), rx);
    (link, ScriptedEngine { input, tx })
}

/// Accepts `lines` command lines, then fails like a pipe to a dead process.
struct Brittle {
    lines: usize,
}

impl Write for Brittle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.lines == 0 {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let ends = buf.iter().filter(|&&b| b == b'\n').count();
        self.lines -= ends.min(self.lines);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Link whose writes break after `lines` commands. The sender keeps the
/// engine side open until dropped.
pub fn brittle_link(lines: usize) -> (Link, Sender<Event>) {
    let (tx, rx) = mpsc::channel();
    (Link::new(Box::new(Brittle { lines }), rx), tx)
}

#[derive(Default)]
pub struct FakeBoard {
    pub position: Option<String>,
    pub playing_as: Option<Color>,
    pub markings: Vec<Marking>,
    pub played: Vec<MoveRequest>,
}

impl FakeBoard {
    pub fn at(position: &str) -> Self {
        FakeBoard {
            position: Some(position.to_owned()),
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), Unavailable> {
        self.position.as_ref().map(|_| ()).ok_or(Unavailable)
    }
}

impl Board for FakeBoard {
    fn position(&self) -> Option<String> {
        self.position.clone()
    }

    fn playing_as(&self) -> Option<Color> {
        self.playing_as
    }

    fn add_marking(&mut self, m: &Marking) -> Result<(), Unavailable> {
        self.check()?;
        self.markings.push(m.clone());
        Ok(())
    }

    fn remove_marking(&mut self, m: &Marking) -> Result<(), Unavailable> {
        self.check()?;
        self.markings.retain(|x| x != m);
        Ok(())
    }

    fn clear_markings(&mut self) -> Result<(), Unavailable> {
        self.check()?;
        self.markings.clear();
        Ok(())
    }

    fn play(&mut self, req: &MoveRequest) -> Result<(), Unavailable> {
        self.check()?;
        self.played.push(*req);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePanel {
    pub settings: Settings,
    pub reports: Vec<Report>,
}

impl Panel for FakePanel {
    fn settings(&self) -> Settings {
        self.settings.clone()
    }

    fn report(&mut self, r: &Report) {
        self.reports.push(*r);
    }
}
