//! 棋譜ノード（1手分の記録）

use crate::types::RecordMove;

/// 棋譜ノードのハンドル（`Record` のアリーナ内の位置と世代）
///
/// ノードが残っている間は同じハンドルを使い続けられる。`Record::remove_after` や
/// `Record::clear` で切り離されたノードのハンドルは無効になり、スロットが再利用されても
/// 世代が異なるため別のノードを指すことはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// 開始局面ノード
    pub const ROOT: NodeId = NodeId { index: 0, generation: 0 };

    #[inline]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        NodeId { index: index as u32, generation }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    #[inline]
    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

/// 棋譜の1手
///
/// 親・本線の次ノード・兄弟（別の変化）へのリンクはすべてハンドルで持つ。
/// 構造に関わるフィールドは `Record` からのみ変更でき、利用側が触れるのはコメントと
/// 付加データだけ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNode {
    pub(crate) number: u32,
    pub(crate) mv: RecordMove,
    pub(crate) parent: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) branch: Option<NodeId>,
    pub(crate) branch_index: u32,
    pub(crate) active_branch: bool,
    pub(crate) comment: String,
    pub(crate) custom_data: Option<String>,
    pub(crate) elapsed_ms: u64,
    pub(crate) total_elapsed_ms: u64,
}

impl RecordNode {
    pub(crate) fn new(
        number: u32,
        parent: Option<NodeId>,
        branch_index: u32,
        active_branch: bool,
        mv: RecordMove,
    ) -> Self {
        Self {
            number,
            mv,
            parent,
            next: None,
            branch: None,
            branch_index,
            active_branch,
            comment: String::new(),
            custom_data: None,
            elapsed_ms: 0,
            total_elapsed_ms: 0,
        }
    }

    /// 開始局面からの手数（開始局面は 0）
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn record_move(&self) -> &RecordMove {
        &self.mv
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// 本線の次ノード（兄弟グループの先頭）
    #[inline]
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// 次の兄弟（同じ親を持つ別の変化）
    #[inline]
    pub fn branch(&self) -> Option<NodeId> {
        self.branch
    }

    /// 兄弟グループ内での作成順（0 が最初）
    #[inline]
    pub fn branch_index(&self) -> u32 {
        self.branch_index
    }

    #[inline]
    pub fn is_active_branch(&self) -> bool {
        self.active_branch
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn custom_data(&self) -> Option<&str> {
        self.custom_data.as_deref()
    }

    pub fn set_custom_data(&mut self, data: Option<String>) {
        self.custom_data = data;
    }

    /// この手の消費時間
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// 同じ手番側の累計消費時間（この手と2手前、4手前…の合計）
    #[inline]
    pub fn total_elapsed_ms(&self) -> u64 {
        self.total_elapsed_ms
    }
}

/// 分:秒（"1:05"）
pub fn format_mss(ms: u64) -> String {
    let sec = ms / 1000;
    format!("{}:{:02}", sec / 60, sec % 60)
}

/// 時:分:秒（"0:01:05"）
pub fn format_hmmss(ms: u64) -> String {
    let sec = ms / 1000;
    format!("{}:{:02}:{:02}", sec / 3600, sec / 60 % 60, sec % 60)
}
