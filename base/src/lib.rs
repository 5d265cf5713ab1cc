pub mod core;
pub mod fen;
pub mod moves;

pub use core::{Color, File, Piece, Rank, Sq};
pub use fen::Fen;
pub use moves::UciMove;
