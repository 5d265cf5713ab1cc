use anyhow::{Context, Result};
use autoplay::{
    config::{Config, MAX_DEPTH},
    console::{ConsoleBoard, ConsolePanel, NoLobby, Output},
    driver::{Driver, StopState},
    engine::EngineSession,
    uci::Link,
};
use autoplay_base::{Color, Fen};
use clap::{Parser, Subcommand};
use std::{
    io::{self, BufReader},
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Engine executable, overrides the configuration.
    #[arg(long)]
    engine: Option<PathBuf>,
    /// Search depth, overrides the configuration.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_DEPTH as i64))]
    depth: Option<u32>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Analyses one position and prints the ranked lines.
    Analyse {
        #[arg(long, default_value = Fen::START)]
        fen: Fen,
    },
    /// Reads positions from stdin, one per line, and reacts to each new one.
    Watch {
        /// Color of the local player (`w` or `b`).
        #[arg(long)]
        play_as: Option<Color>,
        #[arg(long)]
        auto_move: bool,
        #[arg(long)]
        marking: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(engine) = args.engine {
        config.engine.path = engine;
    }
    if let Some(depth) = args.depth {
        config.settings.depth = depth;
    }
    config.validate()?;

    let link = Link::spawn(&config.engine.path, &config.engine.args)?;
    let session = EngineSession::new(link, &config.engine.opts(), config.engine.timeout())
        .context("starting engine session")?;
    let mut session = scopeguard::guard(session, |mut s| s.shutdown());

    match args.cmd {
        Cmd::Analyse { fen } => {
            let depth = config.settings.depth();
            let lines = session
                .evaluate(&fen, depth)
                .with_context(|| format!("analysing {}", fen))?;
            for line in lines {
                println!("{} {} {} {}", line.rank, line.depth, line.score, line.mv);
            }
        }
        Cmd::Watch {
            play_as,
            auto_move,
            marking,
        } => {
            config.settings.auto_move |= auto_move;
            config.settings.marking |= marking;
            let stop = Arc::new(StopState::new());
            let out: Output = Arc::new(Mutex::new(io::stdout()));
            let input = BufReader::new(io::stdin());
            let board = ConsoleBoard::spawn(input, play_as, out.clone(), stop.clone())?;
            let panel = ConsolePanel::new(config.settings.clone(), out);
            stop.register_on_stop(Box::new(|| info!("end of input")));
            Driver::new(&mut session, board, NoLobby, panel).run(config.driver.period(), &stop);
        }
    }
    Ok(())
}
