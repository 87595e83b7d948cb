//! 棋譜ツリー本体（カーソル移動・追記・分岐管理・走査）

use crate::position::Position;
use crate::types::{RecordMove, SpecialMove};

use super::metadata::RecordMetadata;
use super::node::{NodeId, RecordNode, format_hmmss, format_mss};

/// アリーナの1区画
///
/// 解放されると世代を進めて空きリストへ戻す。`node` には解放前の内容が残るが、
/// 世代の一致しないハンドルからは参照されない。
#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: RecordNode,
}

/// 分岐可能な棋譜
///
/// ノードはアリーナに置き、親子・兄弟のリンクは `NodeId` で表す。
/// `position` は常に「初期局面に開始局面からカーソルまでの指し手を順に適用した局面」と一致する。
#[derive(Debug, Clone)]
pub struct Record {
    metadata: RecordMetadata,
    initial_position: Position,
    position: Position,
    slots: Vec<Slot>,
    free: Vec<usize>,
    current: NodeId,
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

impl Record {
    /// 平手初期局面から始まる空の棋譜
    pub fn new() -> Self {
        Self::with_position(&Position::new())
    }

    /// 指定局面から始まる空の棋譜
    pub fn with_position(position: &Position) -> Self {
        Self {
            metadata: RecordMetadata::new(),
            initial_position: position.clone(),
            position: position.clone(),
            slots: vec![Slot { generation: NodeId::ROOT.generation(), node: Self::root_node() }],
            free: Vec::new(),
            current: NodeId::ROOT,
        }
    }

    fn root_node() -> RecordNode {
        RecordNode::new(0, None, 0, true, SpecialMove::Start.into())
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut RecordMetadata {
        &mut self.metadata
    }

    pub fn initial_position(&self) -> &Position {
        &self.initial_position
    }

    /// カーソル位置の局面
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// 開始局面ノード
    pub fn first(&self) -> &RecordNode {
        self.node(NodeId::ROOT)
    }

    pub fn current(&self) -> &RecordNode {
        self.node(self.current)
    }

    pub fn current_id(&self) -> NodeId {
        self.current
    }

    pub fn current_mut(&mut self) -> &mut RecordNode {
        self.node_mut(self.current)
    }

    /// ハンドルが棋譜に残っているノードを指しているか
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(|slot| slot.generation == id.generation())
    }

    /// ハンドルからノードを引く。切り離されたノードのハンドルなら None
    pub fn get(&self, id: NodeId) -> Option<&RecordNode> {
        self.contains(id).then(|| self.node(id))
    }

    /// ハンドルからノードを引く（コメント・付加データの編集用）
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RecordNode> {
        if self.contains(id) { Some(self.node_mut(id)) } else { None }
    }

    /// 棋譜に残っているノード数（開始局面を含む）
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    // リンクから辿ったハンドルは常に有効なので世代は検査しない
    #[inline]
    fn node(&self, id: NodeId) -> &RecordNode {
        &self.slots[id.index()].node
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut RecordNode {
        &mut self.slots[id.index()].node
    }

    /// 兄弟グループの中から選択中のノードを探す
    fn resolve_active(&self, head: NodeId) -> NodeId {
        self.siblings(Some(head)).find(|&id| self.node(id).active_branch).unwrap_or(head)
    }

    /// 選択中の変化に沿ってカーソルより先のノードを辿る
    fn active_line_after(&self, id: NodeId) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut p = self.node(id).next;
        while let Some(head) = p {
            let id = self.resolve_active(head);
            line.push(id);
            p = self.node(id).next;
        }
        line
    }

    /// 開始局面からカーソルまでのハンドル
    fn path_to_current(&self) -> Vec<NodeId> {
        let mut path = vec![self.current];
        let mut p = self.current().parent;
        while let Some(id) = p {
            path.push(id);
            p = self.node(id).parent;
        }
        path.reverse();
        path
    }

    /// 開始局面からカーソルまでのノード（両端を含む）
    pub fn moves_before(&self) -> Vec<&RecordNode> {
        self.path_to_current().into_iter().map(|id| self.node(id)).collect()
    }

    /// `moves` と同じ並びのハンドル
    pub fn move_ids(&self) -> Vec<NodeId> {
        let mut ids = self.path_to_current();
        ids.extend(self.active_line_after(self.current));
        ids
    }

    /// `moves_before` に続けて、選択中の変化の末尾までのノード
    pub fn moves(&self) -> Vec<&RecordNode> {
        self.move_ids().into_iter().map(|id| self.node(id)).collect()
    }

    /// 選択中の変化の末尾の手数
    pub fn length(&self) -> u32 {
        self.active_line_after(self.current)
            .last()
            .map_or(self.current().number, |&id| self.node(id).number)
    }

    /// カーソルが属する兄弟グループの先頭。カーソルが開始局面なら None
    pub fn branch_begin(&self) -> Option<&RecordNode> {
        let parent = self.current().parent?;
        self.node(parent).next.map(|id| self.node(id))
    }

    /// 同じ親を持つ別の変化があるか。無効なハンドルなら false
    pub fn has_branch(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(|node| node.parent)
            .and_then(|p| self.node(p).next)
            .is_some_and(|head| self.node(head).branch.is_some())
    }

    /// 兄弟グループの先頭（最初に作られた変化）か。無効なハンドルなら false
    pub fn is_first_branch(&self, id: NodeId) -> bool {
        match self.get(id).map(|node| node.parent) {
            None => false,
            Some(None) => true,
            Some(Some(p)) => self.node(p).next == Some(id),
        }
    }

    /// 棋譜をクリアして開始局面だけにする
    ///
    /// `position` を渡した場合は初期局面も差し替える。開始局面以外のハンドルは無効になる。
    pub fn clear(&mut self, position: Option<&Position>) {
        if let Some(position) = position {
            self.initial_position = position.clone();
        }
        self.position = self.initial_position.clone();
        let next = self.node_mut(NodeId::ROOT).next.take();
        if let Some(next) = next {
            self.release(next);
        }
        self.current = NodeId::ROOT;
    }

    /// 1手戻る。開始局面なら false
    pub fn go_back(&mut self) -> bool {
        let (parent, mv) = (self.current().parent, self.current().mv);
        let Some(parent) = parent else {
            return false;
        };
        if let RecordMove::Move(mv) = mv {
            self.position.undo_move(&mv);
        }
        self.current = parent;
        true
    }

    /// 選択中の変化に沿って1手進む。末尾なら false
    pub fn go_forward(&mut self) -> bool {
        let Some(head) = self.current().next else {
            return false;
        };
        let next = self.resolve_active(head);
        let mv = self.node(next).mv;
        if let RecordMove::Move(mv) = mv {
            self.position.do_move(&mv);
        }
        self.current = next;
        true
    }

    /// 指定した手数まで移動する
    ///
    /// 範囲外の手数は失敗扱いにせず、移動できるところで止まる。
    pub fn goto(&mut self, number: u32) {
        while number < self.current().number {
            if !self.go_back() {
                break;
            }
        }
        while number > self.current().number {
            if !self.go_forward() {
                break;
            }
        }
    }

    /// すべての兄弟グループで最初に作られた変化を選択し直す
    pub fn reset_all_branch_selection(&mut self) {
        for id in self.preorder(Some(NodeId::ROOT)) {
            let first = self.is_first_branch(id);
            self.node_mut(id).active_branch = first;
        }
    }

    /// カーソルの兄弟グループ内で `branch_index` が一致する変化へ切り替える
    ///
    /// 見つからない場合は何も変更せず false。
    pub fn switch_branch_by_index(&mut self, index: u32) -> bool {
        let Some(parent) = self.current().parent else {
            return false;
        };
        let head = self.node(parent).next;
        let Some(target) = self.siblings(head).find(|&id| self.node(id).branch_index == index)
        else {
            log::debug!("branch {index} not found at ply {}", self.current().number);
            return false;
        };

        let siblings: Vec<NodeId> = self.siblings(head).collect();
        for id in siblings {
            self.node_mut(id).active_branch = id == target;
        }
        let (old_move, new_move) = (self.current().mv, self.node(target).mv);
        if let RecordMove::Move(mv) = old_move {
            self.position.undo_move(&mv);
        }
        if let RecordMove::Move(mv) = new_move {
            self.position.do_move(&mv);
        }
        self.current = target;
        log::debug!("switched to branch {index} at ply {}", self.current().number);
        true
    }

    /// カーソルの後ろに手を追加する
    ///
    /// 通常の指し手は現局面で指せる場合のみ受け付ける。同じ手の変化が既にあれば
    /// 新しいノードは作らずにその変化を選択する。
    pub fn append(&mut self, mv: impl Into<RecordMove>) -> bool {
        let mv = mv.into();
        if let RecordMove::Move(m) = &mv {
            if !self.position.is_valid_move(m) {
                log::debug!("rejected invalid move {} at ply {}", m.to_usi(), self.current().number);
                return false;
            }
            self.position.do_move(m);
        }

        // 終局を表す特殊手の後ろには続けず、その手を差し替える
        if self.current != NodeId::ROOT && self.current().mv.is_special() {
            self.go_back();
        }

        let parent = self.current;
        let number = self.current().number + 1;
        let Some(head) = self.current().next else {
            let id = self.alloc(RecordNode::new(number, Some(parent), 0, true, mv));
            self.node_mut(parent).next = Some(id);
            self.current = id;
            return true;
        };

        let siblings: Vec<NodeId> = self.siblings(Some(head)).collect();
        for &id in &siblings {
            self.node_mut(id).active_branch = false;
        }
        if let Some(&id) = siblings.iter().find(|&&id| self.node(id).mv == mv) {
            self.node_mut(id).active_branch = true;
            self.current = id;
            return true;
        }

        let last = *siblings.last().unwrap_or(&head);
        let branch_index = self.node(last).branch_index + 1;
        let id = self.alloc(RecordNode::new(number, Some(parent), branch_index, true, mv));
        self.node_mut(last).branch = Some(id);
        self.current = id;
        log::debug!("created branch {branch_index} at ply {number}");
        true
    }

    /// 1手戻り、その先の変化をすべて削除する
    ///
    /// 削除したノードのハンドルは無効になる。残ったノードのハンドルは変わらない。
    pub fn remove_after(&mut self) {
        self.go_back();
        let current = self.current;
        let next = self.node_mut(current).next.take();
        if let Some(next) = next {
            let removed = self.release(next);
            log::debug!("removed {removed} nodes after ply {}", self.current().number);
        }
    }

    /// 指定ノードの消費時間を設定し、子孫すべての累計消費時間を更新する
    ///
    /// 無効なハンドルなら何もせず false。
    pub fn set_elapsed_ms(&mut self, id: NodeId, elapsed_ms: u64) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.node_mut(id).elapsed_ms = elapsed_ms;
        self.update_total_elapsed_ms(id);
        let descendants = self.preorder(self.node(id).next);
        for d in descendants {
            self.update_total_elapsed_ms(d);
        }
        true
    }

    fn update_total_elapsed_ms(&mut self, id: NodeId) {
        let node = self.node(id);
        let grandparent_total = node
            .parent
            .and_then(|p| self.node(p).parent)
            .map_or(0, |gp| self.node(gp).total_elapsed_ms);
        let total = node.elapsed_ms + grandparent_total;
        self.node_mut(id).total_elapsed_ms = total;
    }

    /// ツリー全体（すべての変化）を前順に走査する
    ///
    /// 本線を先に辿り、変化は作成順に訪れる。
    pub fn for_each(&self, mut handler: impl FnMut(NodeId, &RecordNode)) {
        for id in self.preorder(Some(NodeId::ROOT)) {
            handler(id, self.node(id));
        }
    }

    /// 棋譜表示用の指し手文字列。無効なハンドルなら None
    pub fn display_move_text(&self, id: NodeId) -> Option<String> {
        let node = self.get(id)?;
        let text = match &node.mv {
            RecordMove::Move(mv) => {
                let prev = node.parent.and_then(|p| self.node(p).mv.as_move());
                mv.display_text(prev)
            }
            RecordMove::Special(special) => special.display_text().to_string(),
        };
        Some(text)
    }

    /// 指し手文字列に消費時間を付けたもの（"☗７六歩 (0:05 / 0:00:05)"）
    pub fn display_text(&self, id: NodeId) -> Option<String> {
        let mut ret = self.display_move_text(id)?;
        let node = self.node(id);
        if node.number != 0 {
            ret += &format!(
                " ({} / {})",
                format_mss(node.elapsed_ms),
                format_hmmss(node.total_elapsed_ms)
            );
        }
        Some(ret)
    }

    /// ノードを空き区画か末尾に置く
    fn alloc(&mut self, node: RecordNode) -> NodeId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = node;
                NodeId::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot { generation: 0, node });
                NodeId::new(self.slots.len() - 1, 0)
            }
        };
        self.update_total_elapsed_ms(id);
        id
    }

    /// `head` とその兄弟・子孫を解放し、解放した数を返す
    fn release(&mut self, head: NodeId) -> usize {
        let ids = self.preorder(Some(head));
        for id in &ids {
            let slot = &mut self.slots[id.index()];
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index());
        }
        ids.len()
    }

    /// `head` から始まる兄弟リスト
    fn siblings(&self, head: Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(head, move |&id| self.node(id).branch)
    }

    /// `start` とその兄弟・子孫を前順に列挙する
    ///
    /// 深い本線でも呼び出しスタックを消費しないよう、保留中の変化を明示的なスタックで管理する。
    fn preorder(&self, start: Option<NodeId>) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut pending = Vec::new();
        let mut p = start;
        while let Some(id) = p {
            order.push(id);
            let node = self.node(id);
            if let Some(branch) = node.branch {
                pending.push(branch);
            }
            p = node.next.or_else(|| pending.pop());
        }
        order
    }
}
