//! USI `position` コマンド形式への出力

use crate::types::{Color, RecordMove};

use super::tree::Record;

impl Record {
    /// 初期局面と開始局面からカーソルまでの指し手（"position sfen ... moves 7g7f ..."）
    ///
    /// 特殊手は出力しない。
    pub fn usi(&self) -> String {
        let mut ret = format!("position {} moves", self.initial_position().usi_sfen());
        for node in self.moves_before() {
            if let RecordMove::Move(mv) = node.record_move() {
                ret.push(' ');
                ret.push_str(&mv.to_usi());
            }
        }
        ret
    }

    /// カーソル位置の局面（"position sfen ..."、手数はカーソルの手数 + 1）
    pub fn sfen(&self) -> String {
        let ply = self.current().number() + 1;
        format!("position sfen {}", self.position().sfen_with_ply(ply))
    }
}

/// `position` コマンド文字列のトークン数から次の手番を求める
///
/// 平手（"startpos"）または先手番の SFEN から始まる場合はトークン数が奇数なら先手番、
/// 後手番の SFEN から始まる場合は偶数なら先手番。
pub fn next_color_from_usi(usi: &str) -> Color {
    let sections: Vec<&str> = usi.split_whitespace().collect();
    let black_first = sections.get(1) == Some(&"startpos") || sections.get(3) == Some(&"b");
    let odd = sections.len() % 2 == 1;
    if black_first == odd { Color::Black } else { Color::White }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_color_from_startpos() {
        assert_eq!(next_color_from_usi("position startpos moves"), Color::Black);
        assert_eq!(next_color_from_usi("position startpos moves 7g7f"), Color::White);
        assert_eq!(next_color_from_usi("position startpos moves 7g7f 3c3d"), Color::Black);
    }

    #[test]
    fn test_next_color_from_sfen() {
        let black = "position sfen lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL b - 1 moves";
        assert_eq!(next_color_from_usi(black), Color::Black);
        assert_eq!(next_color_from_usi(&format!("{black} 7g7f")), Color::White);

        let white = "position sfen lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL w - 1 moves";
        assert_eq!(next_color_from_usi(white), Color::White);
        assert_eq!(next_color_from_usi(&format!("{white} 3c3d")), Color::Black);
    }

    #[test]
    fn test_next_color_ignores_surrounding_whitespace() {
        assert_eq!(next_color_from_usi("  position startpos moves 7g7f \n"), Color::White);
    }
}
