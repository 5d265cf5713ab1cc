use crate::core::{Piece, Sq, SqParseError};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Move in coordinate notation, e.g. `e2e4` or `e7e8q`.
///
/// No legality check is done here: the engine is the only source of these
/// moves and the board widget validates them on its own.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct UciMove {
    pub src: Sq,
    pub dst: Sq,
    pub promote: Option<Piece>,
}

impl UciMove {
    #[inline]
    pub const fn new(src: Sq, dst: Sq) -> UciMove {
        UciMove {
            src,
            dst,
            promote: None,
        }
    }

    #[inline]
    pub const fn with_promote(self, promote: Option<Piece>) -> UciMove {
        UciMove {
            src: self.src,
            dst: self.dst,
            promote,
        }
    }

    /// Returns `true` if both moves go between the same squares.
    #[inline]
    pub fn same_squares(&self, other: &UciMove) -> bool {
        self.src == other.src && self.dst == other.dst
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if let Some(p) = self.promote {
            write!(f, "{}", p)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum UciMoveParseError {
    #[error("bad string length")]
    BadLength,
    #[error("bad source: {0}")]
    BadSrc(SqParseError),
    #[error("bad destination: {0}")]
    BadDst(SqParseError),
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

impl FromStr for UciMove {
    type Err = UciMoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() || !matches!(s.len(), 4 | 5) {
            return Err(UciMoveParseError::BadLength);
        }
        let src = Sq::from_str(&s[0..2]).map_err(UciMoveParseError::BadSrc)?;
        let dst = Sq::from_str(&s[2..4]).map_err(UciMoveParseError::BadDst)?;
        let promote = match s.as_bytes().get(4) {
            Some(&b) => match Piece::from_char(b as char) {
                Some(p) if p.is_promote_target() && b.is_ascii_lowercase() => Some(p),
                _ => return Err(UciMoveParseError::BadPromote(b as char)),
            },
            None => None,
        };
        Ok(UciMove { src, dst, promote })
    }
}
