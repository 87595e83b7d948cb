//! 棋譜モジュール
//!
//! 分岐を持つ棋譜ツリーとカーソル操作。
//!
//! - `Record`: ノードのアリーナ・カーソル・現局面
//! - `RecordNode`: 1手分の記録（手・コメント・消費時間）
//! - `NodeId`: アリーナ内のハンドル
//! - USI `position` コマンド形式への出力

mod metadata;
mod node;
mod tree;
mod usi;

pub use metadata::{RecordMetadata, RecordMetadataKey};
pub use node::{NodeId, RecordNode, format_hmmss, format_mss};
pub use tree::Record;
pub use usi::next_color_from_usi;
