use crate::core::{self, Color, Piece, Sq};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

/// Position encoding as reported by the board and sent to the engine.
///
/// The input text is kept verbatim so that positions compare equal exactly
/// when the board reports the same string twice. Only the shape of the record
/// is validated; whether the position is reachable is the engine's business.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Fen {
    raw: String,
    side: Color,
}

impl Fen {
    pub const START: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SquaresParseError {
    #[error("too many items in rank {0}")]
    RankOverflow(usize),
    #[error("not enough items in rank {0}")]
    RankUnderflow(usize),
    #[error("too many ranks")]
    Overflow,
    #[error("not enough ranks")]
    Underflow,
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

fn parse_squares(s: &str) -> Result<(), SquaresParseError> {
    type Error = SquaresParseError;

    let ranks: Vec<&str> = s.split('/').collect();
    if ranks.len() > 8 {
        return Err(Error::Overflow);
    }
    if ranks.len() < 8 {
        return Err(Error::Underflow);
    }
    for (idx, rank) in ranks.into_iter().enumerate() {
        let mut filled = 0;
        for c in rank.chars() {
            filled += match c {
                '1'..='8' => c as usize - '0' as usize,
                _ if Piece::from_char(c).is_some() => 1,
                _ => return Err(Error::UnexpectedChar(c)),
            };
            if filled > 8 {
                return Err(Error::RankOverflow(8 - idx));
            }
        }
        if filled < 8 {
            return Err(Error::RankUnderflow(8 - idx));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum FenParseError {
    #[error("non-ASCII data in FEN")]
    NonAscii,
    #[error("board not specified")]
    NoBoard,
    #[error("bad board: {0}")]
    Board(#[from] SquaresParseError),
    #[error("no move side")]
    NoMoveSide,
    #[error("bad move side: {0}")]
    MoveSide(#[from] core::ColorParseError),
    #[error("bad castling rights: {0:?}")]
    Castling(String),
    #[error("bad enpassant: {0}")]
    Enpassant(#[from] core::SqParseError),
    #[error("bad move counter: {0}")]
    MoveCounter(ParseIntError),
    #[error("bad move number: {0}")]
    MoveNumber(ParseIntError),
    #[error("extra data in FEN")]
    ExtraData,
}

fn check_castling(s: &str) -> Result<(), FenParseError> {
    if s == "-" || (!s.is_empty() && s.chars().all(|c| "KQkq".contains(c))) {
        Ok(())
    } else {
        Err(FenParseError::Castling(s.to_owned()))
    }
}

impl FromStr for Fen {
    type Err = FenParseError;

    fn from_str(s: &str) -> Result<Fen, Self::Err> {
        type Error = FenParseError;

        let s = s.trim();
        if !s.is_ascii() {
            return Err(Error::NonAscii);
        }
        let mut iter = s.split_ascii_whitespace().fuse();

        parse_squares(iter.next().ok_or(Error::NoBoard)?)?;
        let side = Color::from_str(iter.next().ok_or(Error::NoMoveSide)?)?;
        if let Some(castling) = iter.next() {
            check_castling(castling)?;
        }
        if let Some(ep) = iter.next() {
            if ep != "-" {
                Sq::from_str(ep)?;
            }
        }
        if let Some(counter) = iter.next() {
            u16::from_str(counter).map_err(Error::MoveCounter)?;
        }
        if let Some(number) = iter.next() {
            u16::from_str(number).map_err(Error::MoveNumber)?;
        }
        if iter.next().is_some() {
            return Err(Error::ExtraData);
        }

        Ok(Fen {
            raw: s.to_owned(),
            side,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start() {
        let fen = Fen::from_str(Fen::START).unwrap();
        assert_eq!(fen.side(), Color::White);
        assert_eq!(fen.as_str(), Fen::START);
    }

    #[test]
    fn test_side() {
        let fen =
            Fen::from_str("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
        assert_eq!(fen.side(), Color::Black);
    }

    #[test]
    fn test_short_record() {
        let fen = Fen::from_str("8/8/8/8/8/8/8/K6k w").unwrap();
        assert_eq!(fen.side(), Color::White);
    }

    #[test]
    fn test_errors() {
        assert_eq!(Fen::from_str(""), Err(FenParseError::NoBoard));
        assert_eq!(
            Fen::from_str("8/8/8/8/8/8/8/K6k"),
            Err(FenParseError::NoMoveSide)
        );
        assert_eq!(
            Fen::from_str("8/8/8/8/8/8/8 w"),
            Err(FenParseError::Board(SquaresParseError::Underflow))
        );
        assert_eq!(
            Fen::from_str("8/8/8/8/8/8/8/K7k w"),
            Err(FenParseError::Board(SquaresParseError::RankOverflow(1)))
        );
        assert_eq!(
            Fen::from_str("8/8/8/8/8/8/8/K5x1 w"),
            Err(FenParseError::Board(SquaresParseError::UnexpectedChar('x')))
        );
        assert!(matches!(
            Fen::from_str("8/8/8/8/8/8/8/K6k x"),
            Err(FenParseError::MoveSide(_))
        ));
        assert!(matches!(
            Fen::from_str("8/8/8/8/8/8/8/K6k w - - 0 1 extra"),
            Err(FenParseError::ExtraData)
        ));
        assert!(matches!(
            Fen::from_str("8/8/8/8/8/8/8/K6k w KX - 0 1"),
            Err(FenParseError::Castling(_))
        ));
    }
}
