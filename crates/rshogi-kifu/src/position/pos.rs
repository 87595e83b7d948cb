//! 局面本体

use crate::types::{Color, Move, MoveFrom, Piece, PieceType, Square, parse_usi_move};

use super::sfen::SFEN_HIRATE;

/// 先手視点の (筋の増分, 段の増分)。段の増分が負なら前進。
type Step = (i8, i8);

const KING_STEPS: [Step; 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
const GOLD_STEPS: [Step; 6] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (0, 1)];
const SILVER_STEPS: [Step; 5] = [(-1, -1), (0, -1), (1, -1), (-1, 1), (1, 1)];
const KNIGHT_STEPS: [Step; 2] = [(-1, -2), (1, -2)];
const PAWN_STEPS: [Step; 1] = [(0, -1)];
const ORTHOGONAL: [Step; 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];
const DIAGONAL: [Step; 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const LANCE_SLIDE: [Step; 1] = [(0, -1)];
const NO_STEPS: [Step; 0] = [];

/// 局面（盤面・手駒・手番・手数）
///
/// 合法性は `is_valid_move` による疑似合法チェックのみを扱い、自玉への王手放置や
/// 二歩・打ち歩詰めは判定しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub(super) board: [Option<Piece>; Square::NUM],
    pub(super) hands: [[u8; 7]; Color::NUM],
    pub(super) side_to_move: Color,
    pub(super) game_ply: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// 平手初期局面
    pub fn new() -> Self {
        let mut pos = Self::empty();
        // 定数なので失敗しない
        if let Ok(hirate) = Self::from_sfen(SFEN_HIRATE) {
            pos = hirate;
        }
        pos
    }

    /// 駒のない局面（先手番・1手目）
    pub fn empty() -> Self {
        Self {
            board: [None; Square::NUM],
            hands: [[0; 7]; Color::NUM],
            side_to_move: Color::Black,
            game_ply: 1,
        }
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// 手数（SFEN の4フィールド目）
    #[inline]
    pub fn ply(&self) -> u32 {
        self.game_ply
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    /// 手駒の枚数
    pub fn hand_count(&self, color: Color, piece_type: PieceType) -> u8 {
        piece_type.hand_index().map_or(0, |i| self.hands[color.index()][i])
    }

    /// 盤面・手駒・手番が平手初期局面と一致するか（手数は見ない）
    pub fn is_hirate(&self) -> bool {
        let hirate = Self::new();
        self.board == hirate.board
            && self.hands == hirate.hands
            && self.side_to_move == hirate.side_to_move
    }

    /// USI表記の指し手を現局面の駒情報付きで生成する
    ///
    /// 移動元に駒がない場合や表記が不正な場合は None。合法性は検査しない。
    pub fn create_move_by_usi(&self, usi: &str) -> Option<Move> {
        let (from, to, promote) = parse_usi_move(usi).ok()?;
        match from {
            MoveFrom::Hand(pt) => Some(Move::drop(self.side_to_move, pt, to)),
            MoveFrom::Square(from) => {
                let piece = self.piece_at(from)?;
                Some(Move::normal(from, to, promote, piece, self.piece_at(to)))
            }
        }
    }

    /// 指し手が現局面で指せるか（疑似合法）
    pub fn is_valid_move(&self, mv: &Move) -> bool {
        let us = self.side_to_move;
        if mv.color() != us {
            return false;
        }
        match mv.from {
            MoveFrom::Hand(pt) => {
                mv.piece == Piece::new(us, pt)
                    && !mv.promote
                    && mv.captured.is_none()
                    && self.hand_count(us, pt) > 0
                    && self.piece_at(mv.to).is_none()
                    && !is_dead_end(mv.piece, mv.to)
            }
            MoveFrom::Square(from) => {
                if self.piece_at(from) != Some(mv.piece) || self.piece_at(mv.to) != mv.captured {
                    return false;
                }
                if mv.captured.is_some_and(|c| c.color == us) {
                    return false;
                }
                if !self.reaches(mv.piece, from, mv.to) {
                    return false;
                }
                if mv.promote {
                    mv.piece.piece_type.is_promotable()
                        && !mv.piece.promoted
                        && (in_promotion_zone(us, from) || in_promotion_zone(us, mv.to))
                } else {
                    !is_dead_end(mv.piece, mv.to)
                }
            }
        }
    }

    /// 指し手を適用する（`is_valid_move` で検査済みであること）
    pub fn do_move(&mut self, mv: &Move) {
        let us = mv.color();
        match mv.from {
            MoveFrom::Hand(pt) => {
                if let Some(i) = pt.hand_index() {
                    let count = &mut self.hands[us.index()][i];
                    *count = count.saturating_sub(1);
                }
            }
            MoveFrom::Square(from) => {
                self.board[from.index()] = None;
                if let Some(i) = mv.captured.and_then(|c| c.piece_type.hand_index()) {
                    self.hands[us.index()][i] += 1;
                }
            }
        }
        self.board[mv.to.index()] = Some(mv.placed_piece());
        self.side_to_move = !self.side_to_move;
        self.game_ply += 1;
    }

    /// 直前に適用した指し手を巻き戻す
    pub fn undo_move(&mut self, mv: &Move) {
        let us = mv.color();
        match mv.from {
            MoveFrom::Hand(pt) => {
                self.board[mv.to.index()] = None;
                if let Some(i) = pt.hand_index() {
                    self.hands[us.index()][i] += 1;
                }
            }
            MoveFrom::Square(from) => {
                self.board[mv.to.index()] = mv.captured;
                self.board[from.index()] = Some(mv.piece);
                if let Some(i) = mv.captured.and_then(|c| c.piece_type.hand_index()) {
                    let count = &mut self.hands[us.index()][i];
                    *count = count.saturating_sub(1);
                }
            }
        }
        self.side_to_move = us;
        self.game_ply = self.game_ply.saturating_sub(1);
    }

    fn reaches(&self, piece: Piece, from: Square, to: Square) -> bool {
        let (steps, slides): (&[Step], &[Step]) = if piece.moves_like_gold() {
            (&GOLD_STEPS[..], &NO_STEPS[..])
        } else {
            match (piece.piece_type, piece.promoted) {
                (PieceType::King, _) => (&KING_STEPS[..], &NO_STEPS[..]),
                (PieceType::Gold, _) => (&GOLD_STEPS[..], &NO_STEPS[..]),
                (PieceType::Silver, _) => (&SILVER_STEPS[..], &NO_STEPS[..]),
                (PieceType::Knight, _) => (&KNIGHT_STEPS[..], &NO_STEPS[..]),
                (PieceType::Pawn, _) => (&PAWN_STEPS[..], &NO_STEPS[..]),
                (PieceType::Lance, _) => (&NO_STEPS[..], &LANCE_SLIDE[..]),
                (PieceType::Bishop, false) => (&NO_STEPS[..], &DIAGONAL[..]),
                (PieceType::Bishop, true) => (&ORTHOGONAL[..], &DIAGONAL[..]),
                (PieceType::Rook, false) => (&NO_STEPS[..], &ORTHOGONAL[..]),
                (PieceType::Rook, true) => (&DIAGONAL[..], &ORTHOGONAL[..]),
            }
        };
        let orient = |(df, dr): Step| match piece.color {
            Color::Black => (df, dr),
            Color::White => (-df, -dr),
        };

        if steps.iter().any(|&s| {
            let (df, dr) = orient(s);
            from.offset(df, dr) == Some(to)
        }) {
            return true;
        }
        slides.iter().any(|&s| {
            let (df, dr) = orient(s);
            let mut sq = from;
            while let Some(next) = sq.offset(df, dr) {
                if next == to {
                    return true;
                }
                if self.piece_at(next).is_some() {
                    return false;
                }
                sq = next;
            }
            false
        })
    }
}

/// 手番側から見た段（1 が敵陣の最奥）
#[inline]
fn relative_rank(color: Color, sq: Square) -> u8 {
    match color {
        Color::Black => sq.rank(),
        Color::White => 10 - sq.rank(),
    }
}

#[inline]
fn in_promotion_zone(color: Color, sq: Square) -> bool {
    relative_rank(color, sq) <= 3
}

/// 成らずに置くと以後動けなくなる升目か
fn is_dead_end(piece: Piece, to: Square) -> bool {
    if piece.promoted {
        return false;
    }
    let rank = relative_rank(piece.color, to);
    match piece.piece_type {
        PieceType::Pawn | PieceType::Lance => rank == 1,
        PieceType::Knight => rank <= 2,
        _ => false,
    }
}
