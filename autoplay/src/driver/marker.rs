use crate::analysis::Classification;
use crate::intf::{Board, Marking, Unavailable};
use autoplay_base::{Color, UciMove};

/// Keeps at most one arrow of ours on the board.
#[derive(Debug, Default)]
pub struct Marker {
    last: Option<Marking>,
}

impl Marker {
    pub fn new() -> Self {
        Default::default()
    }

    /// Draws `mv` if it is the player's turn in the analysed position, which
    /// is always the case when the player's color is unknown. Otherwise wipes
    /// all markings from the board.
    pub fn mark(
        &mut self,
        board: &mut impl Board,
        side: Color,
        mv: &UciMove,
        class: Classification,
    ) -> Result<(), Unavailable> {
        let my_turn = board.playing_as().is_none_or(|c| c == side);
        if !my_turn {
            self.last = None;
            return board.clear_markings();
        }
        if let Some(last) = self.last.take() {
            board.remove_marking(&last)?;
        }
        let marking = Marking {
            src: mv.src,
            dst: mv.dst,
            color: class.color(),
        };
        board.add_marking(&marking)?;
        self.last = Some(marking);
        Ok(())
    }

    pub fn last(&self) -> Option<&Marking> {
        self.last.as_ref()
    }
}
