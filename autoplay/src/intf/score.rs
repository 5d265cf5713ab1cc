use autoplay_base::Color;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Bound {
    Lower,
    Upper,
    Exact,
}

impl Default for Bound {
    #[inline]
    fn default() -> Self {
        Bound::Exact
    }
}

/// Engine evaluation.
///
/// `Mate(n)` with `n > 0` means the favored side mates in `n` moves, `n < 0`
/// means it gets mated. Which side is favored depends on the context: scores
/// read from the engine are relative to the side to move, scores stored in
/// analysis results are relative to White (see [`Score::for_white`]).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Score {
    Cp(i32),
    Mate(i32),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ScoreKind {
    Cp,
    Mate,
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreKind::Cp => f.write_str("cp"),
            ScoreKind::Mate => f.write_str("mate"),
        }
    }
}

impl Score {
    #[inline]
    pub fn inv(self) -> Self {
        match self {
            Self::Cp(x) => Self::Cp(x.saturating_neg()),
            Self::Mate(n) => Self::Mate(n.saturating_neg()),
        }
    }

    /// Converts a score relative to `side` into a score relative to White.
    #[inline]
    pub fn for_white(self, side: Color) -> Self {
        match side {
            Color::White => self,
            Color::Black => self.inv(),
        }
    }

    #[inline]
    pub fn kind(&self) -> ScoreKind {
        match self {
            Self::Cp(_) => ScoreKind::Cp,
            Self::Mate(_) => ScoreKind::Mate,
        }
    }

    #[inline]
    pub fn value(&self) -> i32 {
        match *self {
            Self::Cp(v) | Self::Mate(v) => v,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.value())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct BoundedScore {
    pub score: Score,
    pub bound: Bound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_white() {
        assert_eq!(Score::Cp(50).for_white(Color::White), Score::Cp(50));
        assert_eq!(Score::Cp(50).for_white(Color::Black), Score::Cp(-50));
        assert_eq!(Score::Mate(3).for_white(Color::Black), Score::Mate(-3));
        assert_eq!(Score::Mate(-2).for_white(Color::Black), Score::Mate(2));
    }

    #[test]
    fn test_inv_extremes() {
        assert_eq!(Score::Cp(i32::MIN).inv(), Score::Cp(i32::MAX));
        assert_eq!(Score::Mate(i32::MIN).inv(), Score::Mate(i32::MAX));
        assert_eq!(Score::Cp(i32::MAX).inv(), Score::Cp(-i32::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(Score::Cp(-35).to_string(), "cp -35");
        assert_eq!(Score::Mate(3).to_string(), "mate 3");
        assert_eq!(Score::Mate(3).kind().to_string(), "mate");
    }
}
