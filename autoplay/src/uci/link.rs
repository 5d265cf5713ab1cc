use crate::uci::io::{self, Command};
use anyhow::{Context, Result, bail};
use std::{
    io::{BufRead, BufReader, Read, Write},
    path::Path,
    process::{Child, Command as Process, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    thread,
    time::Duration,
};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Line(String),
    /// Something went wrong on the engine side. Informational only.
    Failure(String),
    /// The engine will not send anything anymore.
    Closed,
}

/// Line channel to the engine.
///
/// Commands are written synchronously; output arrives over an `mpsc` channel
/// filled by reader threads, so it can be polled without blocking.
pub struct Link {
    input: Box<dyn Write + Send>,
    events: Receiver<Event>,
    child: Option<Child>,
    closed: bool,
}

fn forward(r: impl Read, tx: Sender<Event>, wrap: fn(String) -> Event, report_close: bool) {
    for ln in BufReader::new(r).lines() {
        let event = match ln {
            Ok(ln) => wrap(ln),
            Err(e) => Event::Failure(format!("reading engine output: {}", e)),
        };
        let failed = matches!(event, Event::Failure(_));
        if tx.send(event).is_err() || failed {
            break;
        }
    }
    if report_close {
        let _ = tx.send(Event::Closed);
    }
}

impl Link {
    /// Wraps an existing channel pair. The events are expected to be plain
    /// engine output lines, one per [`Event::Line`].
    pub fn new(input: Box<dyn Write + Send>, events: Receiver<Event>) -> Link {
        Link {
            input,
            events,
            child: None,
            closed: false,
        }
    }

    /// Starts the engine process and attaches to its standard streams.
    pub fn spawn(path: &Path, args: &[String]) -> Result<Link> {
        let mut child = Process::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawning engine {:?}", path))?;
        let stdin = child.stdin.take().context("no engine stdin")?;
        let stdout = child.stdout.take().context("no engine stdout")?;
        let stderr = child.stderr.take().context("no engine stderr")?;

        let (tx, events) = mpsc::channel();
        let err_tx = tx.clone();
        thread::Builder::new()
            .name("engine-stdout".into())
            .spawn(move || forward(stdout, tx, Event::Line, true))
            .context("starting engine reader")?;
        thread::Builder::new()
            .name("engine-stderr".into())
            .spawn(move || forward(stderr, err_tx, Event::Failure, false))
            .context("starting engine reader")?;

        debug!(pid = child.id(), "engine started");
        Ok(Link {
            input: Box::new(stdin),
            events,
            child: Some(child),
            closed: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn send(&mut self, cmd: &Command) -> Result<()> {
        if self.closed {
            bail!("engine connection closed");
        }
        trace!(?cmd, "to engine");
        io::write_cmd(cmd, &mut self.input).context("writing command")?;
        self.input.flush().context("flushing command")?;
        Ok(())
    }

    fn on_recv(&mut self, event: Option<Event>) -> Option<Event> {
        if matches!(event, Some(Event::Closed)) {
            self.closed = true;
        }
        if let Some(Event::Line(ln)) = &event {
            trace!(line = ln.as_str(), "from engine");
        }
        event
    }

    /// Next pending event, or `None` if there is none right now.
    ///
    /// [`Event::Closed`] is reported once; after that the link stays silent.
    pub fn try_next(&mut self) -> Option<Event> {
        let event = match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) if self.closed => None,
            Err(TryRecvError::Disconnected) => Some(Event::Closed),
        };
        self.on_recv(event)
    }

    /// Like [`Link::try_next`], but waits up to `timeout` for an event.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Event> {
        let event = match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) if self.closed => None,
            Err(RecvTimeoutError::Disconnected) => Some(Event::Closed),
        };
        self.on_recv(event)
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_send() {
        let (mut link, engine) = testing::link();
        link.send(&Command::Uci).unwrap();
        link.send(&Command::Go { depth: 3 }).unwrap();
        assert_eq!(engine.sent(), ["uci", "go depth 3"]);
    }

    #[test]
    fn test_events() {
        let (mut link, engine) = testing::link();
        assert_eq!(link.try_next(), None);
        engine.emit("uciok");
        assert_eq!(link.try_next(), Some(Event::Line("uciok".into())));
        drop(engine);
        assert_eq!(link.try_next(), Some(Event::Closed));
        assert!(link.is_closed());
        assert_eq!(link.try_next(), None);
        assert_eq!(link.next_timeout(Duration::from_millis(1)), None);
        assert!(link.send(&Command::Stop).is_err());
    }

    #[test]
    fn test_forward() {
        let (tx, rx) = mpsc::channel();
        forward(&b"id name Foo\nuciok\n"[..], tx, Event::Line, true);
        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            [
                Event::Line("id name Foo".into()),
                Event::Line("uciok".into()),
                Event::Closed
            ]
        );
    }
}
