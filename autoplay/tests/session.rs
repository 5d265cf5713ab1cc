use autoplay::{
    config::Settings,
    console::NoLobby,
    driver::{Driver, StopState},
    engine::EngineSession,
    intf::{Board, Marking, MoveRequest, Panel, Report, Score, ScoreKind, Unavailable},
    uci::{Event, Link, Opts, Val},
};
use autoplay_base::{Color, Fen};
use std::{
    io::{self, Write},
    str::FromStr,
    sync::{
        Arc, Mutex,
        mpsc::{self, Sender},
    },
    time::Duration,
};

/// Engine that answers every `go` right away with a fixed move per position.
struct Responder {
    tx: Sender<Event>,
    buf: Vec<u8>,
    side: Color,
    log: Arc<Mutex<Vec<String>>>,
}

impl Responder {
    fn on_command(&mut self, cmd: &str) {
        self.log.lock().unwrap().push(cmd.to_owned());
        let emit = |ln: String| {
            let _ = self.tx.send(Event::Line(ln));
        };
        if cmd == "uci" {
            emit("id name Responder".into());
            emit("uciok".into());
        } else if let Some(fen) = cmd.strip_prefix("position fen ") {
            self.side = Fen::from_str(fen).unwrap().side();
        } else if let Some(depth) = cmd.strip_prefix("go depth ") {
            let mv = match self.side {
                Color::White => "g1f3",
                Color::Black => "g8f6",
            };
            emit(format!("info depth {} multipv 1 score cp 20 pv {}", depth, mv));
            emit(format!("bestmove {}", mv));
        }
    }
}

impl Write for Responder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let ln: Vec<u8> = self.buf.drain(..=pos).collect();
            let ln = String::from_utf8_lossy(&ln).trim().to_owned();
            self.on_command(&ln);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn responder() -> (Link, Arc<Mutex<Vec<String>>>) {
    let (tx, rx) = mpsc::channel();
    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = Responder {
        tx,
        buf: Vec::new(),
        side: Color::White,
        log: log.clone(),
    };
    (Link::new(Box::new(engine), rx), log)
}

struct ScriptBoard {
    positions: Vec<&'static str>,
    played: Vec<MoveRequest>,
    markings: Vec<Marking>,
    stop: Arc<StopState>,
}

impl Board for ScriptBoard {
    fn position(&self) -> Option<String> {
        self.positions.last().map(|s| s.to_string())
    }

    fn playing_as(&self) -> Option<Color> {
        None
    }

    fn add_marking(&mut self, m: &Marking) -> Result<(), Unavailable> {
        self.markings.push(m.clone());
        Ok(())
    }

    fn remove_marking(&mut self, m: &Marking) -> Result<(), Unavailable> {
        self.markings.retain(|x| x != m);
        Ok(())
    }

    fn clear_markings(&mut self) -> Result<(), Unavailable> {
        self.markings.clear();
        Ok(())
    }

    // Playing a move pops to the next scripted position.
    fn play(&mut self, req: &MoveRequest) -> Result<(), Unavailable> {
        self.played.push(*req);
        self.positions.pop();
        if self.positions.is_empty() {
            self.stop.stop();
        }
        Ok(())
    }
}

struct Recorder(Settings, Vec<Report>);

impl Panel for Recorder {
    fn settings(&self) -> Settings {
        self.0.clone()
    }

    fn report(&mut self, r: &Report) {
        self.1.push(*r);
    }
}

#[test]
fn evaluate_with_options() {
    let (link, log) = responder();
    let mut opts = Opts::new();
    opts.set("MultiPV", Val::Int(1));
    opts.set("Threads", Val::Int(2));
    let mut session = EngineSession::new(link, &opts, Duration::from_secs(5)).unwrap();

    let lines = session.evaluate(&Fen::from_str(Fen::START).unwrap(), 7).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].depth, 7);
    assert_eq!(lines[0].mv.to_string(), "g1f3");
    assert_eq!(lines[0].score, Score::Cp(20));

    let black = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
    let lines = session.evaluate(&Fen::from_str(black).unwrap(), 7).unwrap();
    assert_eq!(lines[0].mv.to_string(), "g8f6");
    assert_eq!(lines[0].score, Score::Cp(-20));

    session.shutdown();
    let log = log.lock().unwrap();
    assert_eq!(
        log[..3],
        ["uci", "setoption name MultiPV value 1", "setoption name Threads value 2"]
    );
    assert_eq!(log.last().map(String::as_str), Some("quit"));
}

#[test]
fn driver_plays_through_positions() {
    let (link, log) = responder();
    let mut session = EngineSession::new(link, &Opts::new(), Duration::from_secs(5)).unwrap();
    let stop = Arc::new(StopState::new());
    let board = ScriptBoard {
        // Consumed from the back.
        positions: vec![
            "rnbqkbnr/pppppppp/5n2/8/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 2 2",
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1",
            Fen::START,
        ],
        played: Vec::new(),
        markings: Vec::new(),
        stop: stop.clone(),
    };
    let settings = Settings {
        depth: 3,
        min_delay_secs: 0,
        max_delay_secs: 0,
        auto_move: true,
        marking: true,
        ..Default::default()
    };
    let panel = Recorder(settings, Vec::new());

    let mut driver = Driver::new(&mut session, board, NoLobby, panel);
    driver.run(Duration::from_millis(1), &stop);

    let played: Vec<_> = driver
        .board()
        .played
        .iter()
        .map(|r| format!("{}{}", r.src, r.dst))
        .collect();
    assert_eq!(played, ["g1f3", "g8f6", "g1f3"]);
    assert!(driver.board().played.iter().all(|r| !r.animate && r.user_generated));
    assert_eq!(driver.board().markings.len(), 1);

    let reports = &driver.panel().1;
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.kind == ScoreKind::Cp && r.delay.is_zero()));

    drop(driver);
    let gos = log.lock().unwrap().iter().filter(|c| c.starts_with("go")).count();
    assert_eq!(gos, 3);
}
