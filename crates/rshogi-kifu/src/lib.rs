//! 分岐可能な将棋の棋譜
//!
//! 開始局面をルートとする棋譜ツリーを持ち、カーソル位置の局面を常に追跡する。
//! 手の追記・変化の切り替え・消費時間の集計・USI 形式での出力を提供する。
//!
//! ```
//! use rshogi_kifu::{Record, SpecialMove};
//!
//! let mut record = Record::new();
//! let mv = record.position().create_move_by_usi("7g7f").unwrap();
//! assert!(record.append(mv));
//! assert!(record.append(SpecialMove::Resign));
//! assert_eq!(
//!     record.usi(),
//!     "position sfen lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1 moves 7g7f"
//! );
//! ```

pub mod position;
pub mod record;
pub mod types;

pub use position::{Position, SFEN_HIRATE, SfenError};
pub use record::{NodeId, Record, RecordMetadata, RecordMetadataKey, RecordNode};
pub use types::{Color, Move, MoveFrom, Piece, PieceType, RecordMove, SpecialMove, Square};
