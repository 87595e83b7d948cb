//! 升目（Square）

use super::MoveParseError;

/// 升目（0-80）
///
/// 配置: SQ_11(1一)=0, SQ_12(1二)=1, ..., SQ_19(1九)=8, SQ_21(2一)=9, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    /// 升目の数
    pub const NUM: usize = 81;

    /// 筋（1-9）と段（1-9）から生成
    #[inline]
    pub const fn new(file: u8, rank: u8) -> Option<Square> {
        if file >= 1 && file <= 9 && rank >= 1 && rank <= 9 {
            Some(Square((file - 1) * 9 + (rank - 1)))
        } else {
            None
        }
    }

    /// u8から生成（範囲チェックあり）
    #[inline]
    pub const fn from_index(n: usize) -> Option<Square> {
        if n < Self::NUM { Some(Square(n as u8)) } else { None }
    }

    /// 筋（1-9）
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 / 9 + 1
    }

    /// 段（1-9、一段目が上）
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 % 9 + 1
    }

    /// インデックスとして使用
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 筋・段方向にずらした升目。盤外なら None
    ///
    /// `df` は筋番号の増分、`dr` は段番号の増分（先手から見て下向きが正）。
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        let file = self.file() as i8 + df;
        let rank = self.rank() as i8 + dr;
        if (1..=9).contains(&file) && (1..=9).contains(&rank) {
            Square::new(file as u8, rank as u8)
        } else {
            None
        }
    }

    /// 全升目（インデックス順）
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::NUM as u8).map(Square)
    }

    /// 棋譜表示用（"７六"）
    pub fn to_japanese(self) -> String {
        const FILES: [&str; 9] = ["１", "２", "３", "４", "５", "６", "７", "８", "９"];
        const RANKS: [&str; 9] = ["一", "二", "三", "四", "五", "六", "七", "八", "九"];
        format!("{}{}", FILES[self.file() as usize - 1], RANKS[self.rank() as usize - 1])
    }
}

/// USI表記（"7g"）
impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (b'0' + self.file()) as char;
        let rank = (b'a' + self.rank() - 1) as char;
        write!(f, "{file}{rank}")
    }
}

impl std::str::FromStr for Square {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(MoveParseError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'0');
        let rank = bytes[1].wrapping_sub(b'a').wrapping_add(1);
        Square::new(file, rank).ok_or_else(|| MoveParseError::InvalidSquare(s.to_string()))
    }
}
