//! 指し手（Move）と特殊手（SpecialMove）

use serde::{Deserialize, Serialize};

use super::{Color, Piece, PieceType, Square};

/// USI指し手表記の解析エラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Invalid square notation: {0}")]
    InvalidSquare(String),
    #[error("Invalid move format: {0}")]
    InvalidMoveFormat(String),
    #[error("Invalid piece character: {0}")]
    InvalidPiece(char),
}

/// 移動元（盤上の升目、または手駒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveFrom {
    Square(Square),
    Hand(PieceType),
}

/// 1手分の指し手
///
/// 動かす駒と取る駒を保持するので、`Position::undo_move` は指し手だけで局面を戻せる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: MoveFrom,
    pub to: Square,
    pub promote: bool,
    /// 移動前の駒
    pub piece: Piece,
    pub captured: Option<Piece>,
}

impl Move {
    /// 盤上の駒を動かす手
    pub const fn normal(
        from: Square,
        to: Square,
        promote: bool,
        piece: Piece,
        captured: Option<Piece>,
    ) -> Self {
        Self { from: MoveFrom::Square(from), to, promote, piece, captured }
    }

    /// 駒打ち
    pub const fn drop(color: Color, piece_type: PieceType, to: Square) -> Self {
        Self {
            from: MoveFrom::Hand(piece_type),
            to,
            promote: false,
            piece: Piece::new(color, piece_type),
            captured: None,
        }
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.piece.color
    }

    #[inline]
    pub const fn is_drop(&self) -> bool {
        matches!(self.from, MoveFrom::Hand(_))
    }

    /// 移動後の駒
    #[inline]
    pub const fn placed_piece(&self) -> Piece {
        if self.promote { self.piece.promote() } else { self.piece }
    }

    /// USI形式（"7g7f"、"8h2b+"、"P*5e"）
    pub fn to_usi(&self) -> String {
        match self.from {
            MoveFrom::Hand(pt) => format!("{}*{}", pt.to_usi_char(), self.to),
            MoveFrom::Square(from) if self.promote => format!("{from}{}+", self.to),
            MoveFrom::Square(from) => format!("{from}{}", self.to),
        }
    }

    /// 棋譜表示用の文字列（"☗７六歩"、"☖同　角成"）
    ///
    /// 直前の手と移動先が同じ場合は升目の代わりに「同　」を使う。
    pub fn display_text(&self, prev: Option<&Move>) -> String {
        let mut ret = String::from(self.color().symbol());
        match prev {
            Some(prev) if prev.to == self.to => ret.push_str("同　"),
            _ => ret.push_str(&self.to.to_japanese()),
        }
        ret.push_str(self.piece.piece_type.to_japanese(self.piece.promoted));
        if self.promote {
            ret.push('成');
        } else if self.is_drop() {
            ret.push('打');
        }
        ret
    }
}

/// USI指し手表記を (移動元, 移動先, 成り) に分解する
///
/// 駒情報は局面がないと決まらないので、`Move` の生成は `Position::create_move_by_usi` で行う。
pub fn parse_usi_move(s: &str) -> Result<(MoveFrom, Square, bool), MoveParseError> {
    if let Some((piece, to)) = s.split_once('*') {
        let mut chars = piece.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(MoveParseError::InvalidMoveFormat(s.to_string()));
        };
        let piece_type = PieceType::from_usi_char(c)
            .filter(|pt| *pt != PieceType::King)
            .ok_or(MoveParseError::InvalidPiece(c))?;
        return Ok((MoveFrom::Hand(piece_type), to.parse()?, false));
    }

    let (body, promote) = match s.strip_suffix('+') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };
    if body.len() != 4 || !body.is_ascii() {
        return Err(MoveParseError::InvalidMoveFormat(s.to_string()));
    }
    let from: Square = body[0..2].parse()?;
    let to: Square = body[2..4].parse()?;
    Ok((MoveFrom::Square(from), to, promote))
}

/// 特殊手（開始局面・終局・中断などの記録用マーカー）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialMove {
    Start,
    Interrupt,
    Resign,
    Draw,
    RepetitionDraw,
    Mate,
    Timeout,
    /// 手番側の勝ち（直前の指し手が反則手）
    FoulWin,
    /// 手番側の負け
    FoulLose,
    EnteringOfKing,
    WinByDefault,
    LossByDefault,
}

impl SpecialMove {
    pub const ALL: [SpecialMove; 12] = [
        SpecialMove::Start,
        SpecialMove::Interrupt,
        SpecialMove::Resign,
        SpecialMove::Draw,
        SpecialMove::RepetitionDraw,
        SpecialMove::Mate,
        SpecialMove::Timeout,
        SpecialMove::FoulWin,
        SpecialMove::FoulLose,
        SpecialMove::EnteringOfKing,
        SpecialMove::WinByDefault,
        SpecialMove::LossByDefault,
    ];

    /// 識別名（"repetitionDraw" など）
    pub const fn name(self) -> &'static str {
        match self {
            SpecialMove::Start => "start",
            SpecialMove::Interrupt => "interrupt",
            SpecialMove::Resign => "resign",
            SpecialMove::Draw => "draw",
            SpecialMove::RepetitionDraw => "repetitionDraw",
            SpecialMove::Mate => "mate",
            SpecialMove::Timeout => "timeout",
            SpecialMove::FoulWin => "foulWin",
            SpecialMove::FoulLose => "foulLose",
            SpecialMove::EnteringOfKing => "enteringOfKing",
            SpecialMove::WinByDefault => "winByDefault",
            SpecialMove::LossByDefault => "lossByDefault",
        }
    }

    /// 棋譜表示用の文字列
    pub const fn display_text(self) -> &'static str {
        match self {
            SpecialMove::Start => "開始局面",
            SpecialMove::Interrupt => "中断",
            SpecialMove::Resign => "投了",
            SpecialMove::Draw => "持将棋",
            SpecialMove::RepetitionDraw => "千日手",
            SpecialMove::Mate => "詰み",
            SpecialMove::Timeout => "切れ負け",
            SpecialMove::FoulWin => "反則勝ち",
            SpecialMove::FoulLose => "反則負け",
            SpecialMove::EnteringOfKing => "入玉",
            SpecialMove::WinByDefault => "不戦勝",
            SpecialMove::LossByDefault => "不戦敗",
        }
    }
}

impl std::str::FromStr for SpecialMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpecialMove::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| MoveParseError::InvalidMoveFormat(s.to_string()))
    }
}

/// 棋譜の1ノードを生成した手（通常の指し手または特殊手）
///
/// 同値判定は指し手同士なら構造的一致、特殊手同士なら同じ種類であること。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordMove {
    Move(Move),
    Special(SpecialMove),
}

impl RecordMove {
    #[inline]
    pub const fn as_move(&self) -> Option<&Move> {
        match self {
            RecordMove::Move(mv) => Some(mv),
            RecordMove::Special(_) => None,
        }
    }

    #[inline]
    pub const fn is_special(&self) -> bool {
        matches!(self, RecordMove::Special(_))
    }
}

impl From<Move> for RecordMove {
    fn from(mv: Move) -> Self {
        RecordMove::Move(mv)
    }
}

impl From<SpecialMove> for RecordMove {
    fn from(mv: SpecialMove) -> Self {
        RecordMove::Special(mv)
    }
}
