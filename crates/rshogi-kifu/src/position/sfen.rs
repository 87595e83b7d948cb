//! SFEN形式の解析・出力

use crate::types::{Color, HAND_ORDER, Piece, PieceType, Square};

use super::pos::Position;

/// 平手初期局面のSFEN
pub const SFEN_HIRATE: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1";

/// SFENパースエラー
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SfenError {
    /// 盤面の形式が不正
    #[error("Invalid board: {0}")]
    Board(String),
    /// 手番の形式が不正
    #[error("Invalid side to move: {0}")]
    SideToMove(String),
    /// 手駒の形式が不正
    #[error("Invalid hand: {0}")]
    Hand(String),
    /// 手数の形式が不正
    #[error("Invalid ply: {0}")]
    Ply(String),
}

impl Position {
    /// SFEN文字列から局面を生成（先頭の "sfen " は省略可）
    pub fn from_sfen(sfen: &str) -> Result<Position, SfenError> {
        let sfen = sfen.trim();
        let sfen = sfen.strip_prefix("sfen ").unwrap_or(sfen);
        let parts: Vec<&str> = sfen.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(SfenError::Board("SFEN must have at least 3 parts".to_string()));
        }

        let mut pos = Position::empty();

        // 1. 盤面
        pos.parse_board(parts[0])?;

        // 2. 手番
        pos.side_to_move = match parts[1] {
            "b" => Color::Black,
            "w" => Color::White,
            other => {
                return Err(SfenError::SideToMove(format!("Expected 'b' or 'w', got '{other}'")));
            }
        };

        // 3. 手駒
        pos.parse_hand(parts[2])?;

        // 4. 手数（オプション）
        if let Some(ply) = parts.get(3) {
            pos.game_ply = ply.parse().map_err(|_| SfenError::Ply(ply.to_string()))?;
        }

        Ok(pos)
    }

    /// 現局面のSFEN文字列
    pub fn to_sfen(&self) -> String {
        self.sfen_with_ply(self.game_ply)
    }

    /// 手数フィールドを指定してSFEN文字列を生成
    pub fn sfen_with_ply(&self, ply: u32) -> String {
        let mut result = String::new();

        // 1. 盤面（9筋から1筋へ、一段目から九段目へ）
        for rank in 1..=9 {
            let mut empty_count = 0;
            for file in (1..=9).rev() {
                match Square::new(file, rank).and_then(|sq| self.piece_at(sq)) {
                    None => empty_count += 1,
                    Some(pc) => {
                        if empty_count > 0 {
                            result.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        result.push_str(&pc.to_sfen());
                    }
                }
            }
            if empty_count > 0 {
                result.push_str(&empty_count.to_string());
            }
            if rank < 9 {
                result.push('/');
            }
        }

        // 2. 手番
        result.push(' ');
        result.push(self.side_to_move.to_sfen_char());

        // 3. 手駒（先手→後手、飛角金銀桂香歩の順）
        result.push(' ');
        let hand = self.hand_to_sfen();
        if hand.is_empty() {
            result.push('-');
        } else {
            result.push_str(&hand);
        }

        // 4. 手数
        result.push(' ');
        result.push_str(&ply.to_string());

        result
    }

    /// `position` コマンドに埋め込む形式（"sfen ..."）
    pub fn usi_sfen(&self) -> String {
        format!("sfen {}", self.to_sfen())
    }

    fn hand_to_sfen(&self) -> String {
        let mut s = String::new();
        for color in [Color::Black, Color::White] {
            for pt in HAND_ORDER {
                let count = self.hand_count(color, pt);
                if count == 0 {
                    continue;
                }
                if count > 1 {
                    s.push_str(&count.to_string());
                }
                let c = pt.to_usi_char();
                s.push(if color == Color::Black { c } else { c.to_ascii_lowercase() });
            }
        }
        s
    }

    /// 盤面部分をパース
    fn parse_board(&mut self, board_str: &str) -> Result<(), SfenError> {
        let ranks: Vec<&str> = board_str.split('/').collect();
        if ranks.len() != 9 {
            return Err(SfenError::Board(format!("Expected 9 ranks, got {}", ranks.len())));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = rank_idx as u8 + 1;
            // 9筋から開始
            let mut file = 9i8;
            let mut promoted = false;

            for c in rank_str.chars() {
                if c == '+' {
                    promoted = true;
                    continue;
                }
                if let Some(digit) = c.to_digit(10) {
                    file -= digit as i8;
                    if file < 0 {
                        return Err(SfenError::Board(format!("Too many squares in rank {rank}")));
                    }
                    continue;
                }

                let sq = Square::new(file as u8, rank)
                    .ok_or_else(|| SfenError::Board(format!("Too many pieces in rank {rank}")))?;
                let piece_type = PieceType::from_usi_char(c)
                    .ok_or_else(|| SfenError::Board(format!("Unknown piece character: {c}")))?;
                let color = if c.is_ascii_uppercase() { Color::Black } else { Color::White };
                let mut pc = Piece::new(color, piece_type);
                if promoted {
                    if !piece_type.is_promotable() {
                        return Err(SfenError::Board(format!("Piece cannot promote: +{c}")));
                    }
                    pc = pc.promote();
                }
                self.board[sq.index()] = Some(pc);
                promoted = false;
                file -= 1;
            }

            if file != 0 {
                return Err(SfenError::Board(format!("Rank {rank} does not have 9 squares")));
            }
        }
        Ok(())
    }

    /// 手駒部分をパース（"2P3l" や "-"）
    fn parse_hand(&mut self, hand_str: &str) -> Result<(), SfenError> {
        if hand_str == "-" {
            return Ok(());
        }

        let mut count: Option<u8> = None;
        for c in hand_str.chars() {
            if let Some(digit) = c.to_digit(10) {
                let n = count.unwrap_or(0).saturating_mul(10).saturating_add(digit as u8);
                count = Some(n);
                continue;
            }
            let index = PieceType::from_usi_char(c)
                .and_then(PieceType::hand_index)
                .ok_or_else(|| SfenError::Hand(format!("Unknown piece in hand: {c}")))?;
            let color = if c.is_ascii_uppercase() { Color::Black } else { Color::White };
            let slot = &mut self.hands[color.index()][index];
            *slot = slot.saturating_add(count.take().unwrap_or(1));
        }
        if count.is_some() {
            return Err(SfenError::Hand(format!("Trailing count in hand: {hand_str}")));
        }
        Ok(())
    }
}
