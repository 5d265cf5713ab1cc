use crate::intf::Score;
use std::fmt;

/// Label of an analysed move, used to pick the color of its board arrow.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Classification {
    Brilliant,
    Great,
    Best,
    Excellent,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
    Book,
    Forced,
    Unclassified,
}

impl Classification {
    pub const fn color(self) -> &'static str {
        match self {
            Self::Brilliant => "#1baca6",
            Self::Great => "#5c8bb0",
            Self::Best | Self::Excellent => "#98bc49",
            Self::Good | Self::Forced => "#97af8b",
            Self::Inaccuracy => "#f4bf44",
            Self::Mistake => "#e28c28",
            Self::Blunder => "#c93230",
            Self::Book => "#a88764",
            Self::Unclassified => "#000000",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brilliant => "brilliant",
            Self::Great => "great",
            Self::Best => "best",
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Inaccuracy => "inaccuracy",
            Self::Mistake => "mistake",
            Self::Blunder => "blunder",
            Self::Book => "book",
            Self::Forced => "forced",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels an evaluation. A mate in any number of moves is forced play, any
/// centipawn evaluation is treated as the best move.
///
/// Gives `None` if there is no evaluation; the caller decides what to show
/// instead.
pub fn classify(score: Option<&Score>) -> Option<Classification> {
    match score? {
        Score::Mate(_) => Some(Classification::Forced),
        Score::Cp(_) => Some(Classification::Best),
    }
}
