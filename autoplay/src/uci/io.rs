use crate::intf::{Bound, BoundedScore, Score};
use crate::uci::opts::Val;
use anyhow::Result;
use autoplay_base::{Fen, UciMove, moves::UciMoveParseError};
use std::{io::Write, iter::Peekable, num::ParseIntError, str::FromStr};
use thiserror::Error;

#[derive(Clone, Debug)]
pub enum Command<'a> {
    Uci,
    SetOption { name: &'a str, value: &'a Val },
    Position(&'a Fen),
    Go { depth: u32 },
    Stop,
    Quit,
}

/// Fields of one `info` line. A field the line does not carry is `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Info {
    pub depth: Option<u32>,
    pub multipv: Option<u32>,
    /// Relative to the side to move.
    pub score: Option<BoundedScore>,
    /// First move of the principal variation.
    pub pv: Option<UciMove>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BestMove {
    /// `None` if the engine had no move to play (`(none)` or `0000`).
    pub best: Option<UciMove>,
    pub ponder: Option<UciMove>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    UciOk,
    ReadyOk,
    Id(String),
    Info(Info),
    BestMove(BestMove),
    Other,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MsgParseError {
    #[error("no value for {0:?}")]
    NoValue(&'static str),
    #[error("bad value for {key:?}: {source}")]
    BadInt {
        key: &'static str,
        source: ParseIntError,
    },
    #[error("bad move for {key:?}: {source}")]
    BadMove {
        key: &'static str,
        source: UciMoveParseError,
    },
    #[error("bad score type {0:?}")]
    BadScoreType(String),
}

pub fn write_cmd(cmd: &Command, w: &mut (impl Write + ?Sized)) -> Result<()> {
    match cmd {
        Command::Uci => writeln!(w, "uci")?,
        Command::SetOption { name, value } => {
            writeln!(w, "setoption name {} value {}", name, value)?
        }
        Command::Position(fen) => writeln!(w, "position fen {}", fen)?,
        Command::Go { depth } => writeln!(w, "go depth {}", depth)?,
        Command::Stop => writeln!(w, "stop")?,
        Command::Quit => writeln!(w, "quit")?,
    }
    Ok(())
}

// Info keys followed by exactly one value we have no use for.
const SKIP_ONE: &[&str] = &[
    "seldepth",
    "time",
    "nodes",
    "nps",
    "hashfull",
    "tbhits",
    "sbhits",
    "cpuload",
    "currmove",
    "currmovenumber",
];

// Info keys followed by a list of moves.
const MOVE_LISTS: &[&str] = &["refutation", "currline"];

fn is_key(token: &str) -> bool {
    matches!(
        token,
        "depth" | "multipv" | "score" | "pv" | "string" | "wdl" | "lowerbound" | "upperbound"
    ) || SKIP_ONE.contains(&token)
        || MOVE_LISTS.contains(&token)
}

fn parse_int<T>(key: &'static str, token: Option<&str>) -> Result<T, MsgParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    let token = token.ok_or(MsgParseError::NoValue(key))?;
    T::from_str(token).map_err(|source| MsgParseError::BadInt { key, source })
}

fn parse_move(key: &'static str, token: Option<&str>) -> Result<UciMove, MsgParseError> {
    let token = token.ok_or(MsgParseError::NoValue(key))?;
    UciMove::from_str(token).map_err(|source| MsgParseError::BadMove { key, source })
}

fn skip_moves<'a>(tokens: &mut Peekable<impl Iterator<Item = &'a str>>) {
    while tokens.next_if(|t| !is_key(t)).is_some() {}
}

fn parse_info<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Info, MsgParseError> {
    let mut tokens = tokens.peekable();
    let mut info = Info::default();
    while let Some(token) = tokens.next() {
        match token {
            "depth" => info.depth = Some(parse_int("depth", tokens.next())?),
            "multipv" => info.multipv = Some(parse_int("multipv", tokens.next())?),
            "score" => {
                let score = match tokens.next() {
                    Some("cp") => Score::Cp(parse_int("cp", tokens.next())?),
                    Some("mate") => Score::Mate(parse_int("mate", tokens.next())?),
                    Some(kind) => return Err(MsgParseError::BadScoreType(kind.to_owned())),
                    None => return Err(MsgParseError::NoValue("score")),
                };
                let bound = match tokens.next_if(|t| matches!(*t, "lowerbound" | "upperbound")) {
                    Some("lowerbound") => Bound::Lower,
                    Some(_) => Bound::Upper,
                    None => Bound::Exact,
                };
                info.score = Some(BoundedScore { score, bound });
            }
            "pv" => {
                info.pv = Some(parse_move("pv", tokens.next())?);
                skip_moves(&mut tokens);
            }
            "wdl" => {
                for _ in 0..3 {
                    _ = tokens.next();
                }
            }
            // The rest of the line is free text.
            "string" => break,
            t if SKIP_ONE.contains(&t) => {
                _ = tokens.next();
            }
            t if MOVE_LISTS.contains(&t) => skip_moves(&mut tokens),
            _ => {
                // Unknown token, engines are free to add their own.
            }
        }
    }
    Ok(info)
}

fn parse_best_move<'a>(
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<BestMove, MsgParseError> {
    let parse = |key, token: Option<&str>| match token {
        Some("(none)") | Some("0000") => Ok(None),
        token => parse_move(key, token).map(Some),
    };
    let best = parse("bestmove", tokens.next())?;
    let ponder = match tokens.next() {
        Some("ponder") => parse("ponder", tokens.next())?,
        _ => None,
    };
    Ok(BestMove { best, ponder })
}

/// Parses one line of engine output.
///
/// Lines of unknown kind give [`Message::Other`]. A known key with a missing
/// or malformed value makes the whole line an error.
pub fn parse_msg(ln: &str) -> Result<Message, MsgParseError> {
    let mut tokens = ln.split_ascii_whitespace();
    match tokens.next() {
        Some("info") => parse_info(tokens).map(Message::Info),
        Some("bestmove") => parse_best_move(tokens).map(Message::BestMove),
        Some("uciok") => Ok(Message::UciOk),
        Some("readyok") => Ok(Message::ReadyOk),
        Some("id") => match tokens.next() {
            Some("name") => Ok(Message::Id(tokens.collect::<Vec<_>>().join(" "))),
            _ => Ok(Message::Other),
        },
        _ => Ok(Message::Other),
    }
}
