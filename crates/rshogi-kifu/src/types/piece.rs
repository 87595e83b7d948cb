//! 駒種（PieceType）と駒（Piece）

use super::Color;

/// 駒種（成りは `Piece::promoted` で表す）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PieceType {
    King = 0,
    Rook = 1,
    Bishop = 2,
    Gold = 3,
    Silver = 4,
    Knight = 5,
    Lance = 6,
    Pawn = 7,
}

/// 手駒配列の並び順（King を除く 7 種、SFEN の出力順）
pub const HAND_ORDER: [PieceType; 7] = [
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Gold,
    PieceType::Silver,
    PieceType::Knight,
    PieceType::Lance,
    PieceType::Pawn,
];

impl PieceType {
    /// 成れる駒種か
    #[inline]
    pub const fn is_promotable(self) -> bool {
        !matches!(self, PieceType::King | PieceType::Gold)
    }

    /// 手駒配列のインデックス（King は None）
    #[inline]
    pub const fn hand_index(self) -> Option<usize> {
        match self {
            PieceType::King => None,
            pt => Some(pt as usize - 1),
        }
    }

    /// USI/SFEN の駒文字（先手＝大文字）
    pub const fn to_usi_char(self) -> char {
        match self {
            PieceType::King => 'K',
            PieceType::Rook => 'R',
            PieceType::Bishop => 'B',
            PieceType::Gold => 'G',
            PieceType::Silver => 'S',
            PieceType::Knight => 'N',
            PieceType::Lance => 'L',
            PieceType::Pawn => 'P',
        }
    }

    /// 駒文字から駒種へ（大文字・小文字を区別しない）
    pub fn from_usi_char(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'K' => Some(PieceType::King),
            'R' => Some(PieceType::Rook),
            'B' => Some(PieceType::Bishop),
            'G' => Some(PieceType::Gold),
            'S' => Some(PieceType::Silver),
            'N' => Some(PieceType::Knight),
            'L' => Some(PieceType::Lance),
            'P' => Some(PieceType::Pawn),
            _ => None,
        }
    }

    /// 棋譜表示用の駒名
    pub const fn to_japanese(self, promoted: bool) -> &'static str {
        match (self, promoted) {
            (PieceType::King, _) => "玉",
            (PieceType::Rook, false) => "飛",
            (PieceType::Rook, true) => "龍",
            (PieceType::Bishop, false) => "角",
            (PieceType::Bishop, true) => "馬",
            (PieceType::Gold, _) => "金",
            (PieceType::Silver, false) => "銀",
            (PieceType::Silver, true) => "成銀",
            (PieceType::Knight, false) => "桂",
            (PieceType::Knight, true) => "成桂",
            (PieceType::Lance, false) => "香",
            (PieceType::Lance, true) => "成香",
            (PieceType::Pawn, false) => "歩",
            (PieceType::Pawn, true) => "と",
        }
    }
}

/// 盤上の駒
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    pub promoted: bool,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Self { color, piece_type, promoted: false }
    }

    #[inline]
    pub const fn promote(self) -> Self {
        Self { promoted: true, ..self }
    }

    /// SFEN表記（"+p"、"K" など）
    pub fn to_sfen(self) -> String {
        let c = self.piece_type.to_usi_char();
        let c = match self.color {
            Color::Black => c,
            Color::White => c.to_ascii_lowercase(),
        };
        if self.promoted { format!("+{c}") } else { c.to_string() }
    }

    /// 金と同じ動きをする駒か（金・成駒）
    #[inline]
    pub const fn moves_like_gold(self) -> bool {
        matches!(self.piece_type, PieceType::Gold)
            || (self.promoted
                && matches!(
                    self.piece_type,
                    PieceType::Silver | PieceType::Knight | PieceType::Lance | PieceType::Pawn
                ))
    }
}
