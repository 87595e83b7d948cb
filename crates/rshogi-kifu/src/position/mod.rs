//! 局面表現モジュール
//!
//! 棋譜の現在局面・初期局面として使う盤面。
//!
//! - `Position`: 盤面配列・手駒・手番・手数
//! - `do_move` / `undo_move`: 手の実行と巻き戻し（指し手が取った駒を保持するので状態スタックは持たない）
//! - `is_valid_move`: 疑似合法チェック
//! - SFEN形式の解析・出力

mod pos;
mod sfen;

pub use pos::Position;
pub use sfen::{SFEN_HIRATE, SfenError};
