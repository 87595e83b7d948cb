//! 基本型（手番・升目・駒・指し手）

mod color;
mod moves;
mod piece;
mod square;

pub use color::Color;
pub use moves::{Move, MoveFrom, MoveParseError, RecordMove, SpecialMove, parse_usi_move};
pub use piece::{HAND_ORDER, Piece, PieceType};
pub use square::Square;
