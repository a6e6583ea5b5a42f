//! 棋盤邏輯
//!
//! 只負責幾何與儲存，不做任何合法性判斷。
//! 不變式：每個非空格子裡的棋子，其 `position` 必等於該格座標，
//! 且同一個棋子 ID 最多只出現在一格。

use crate::alias::{Coord, PieceId};
use crate::component::{Color, Piece, PieceType, Position};
use crate::constants::*;
use crate::logic::id_generator::IdGenerator;
use serde::{Deserialize, Serialize};
use std::fmt;

type Grid = [[Option<Piece>; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

/// 9x10 棋盤，棋子以值儲存，`clone` 即為深拷貝
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: Grid,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self {
            cells: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
        }
    }

    /// 標準開局
    pub fn standard(ids: &mut IdGenerator) -> Self {
        const BACK_RANK: [PieceType; 9] = [
            PieceType::Chariot,
            PieceType::Horse,
            PieceType::Elephant,
            PieceType::Advisor,
            PieceType::King,
            PieceType::Advisor,
            PieceType::Elephant,
            PieceType::Horse,
            PieceType::Chariot,
        ];

        let mut board = Self::empty();
        for (color, back_y, cannon_y, pawn_y) in [
            (Color::Black, 0, 2, BLACK_PAWN_ROW),
            (Color::Red, 9, 7, RED_PAWN_ROW),
        ] {
            for (x, piece_type) in BACK_RANK.iter().enumerate() {
                let pos = Position::new(x as Coord, back_y);
                board.set_piece(pos, Some(Piece::new(ids.mint(), *piece_type, color, pos)));
            }
            for x in [1, 7] {
                let pos = Position::new(x, cannon_y);
                board.set_piece(
                    pos,
                    Some(Piece::new(ids.mint(), PieceType::Cannon, color, pos)),
                );
            }
            for x in PAWN_FILES {
                let pos = Position::new(x, pawn_y);
                board.set_piece(pos, Some(Piece::new(ids.mint(), PieceType::Pawn, color, pos)));
            }
        }
        board
    }

    pub fn is_valid_position(pos: Position) -> bool {
        pos.is_on_board()
    }

    /// 棋盤外回傳 None
    pub fn get_piece(&self, pos: Position) -> Option<&Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.cells[pos.y as usize][pos.x as usize].as_ref()
    }

    /// 放置或清除棋子，棋盤外為 no-op
    ///
    /// 放入的棋子位置會被改寫為 `pos`；若同 ID 的棋子在別格，那一格會被清空。
    pub fn set_piece(&mut self, pos: Position, piece: Option<Piece>) {
        if !pos.is_on_board() {
            return;
        }
        let piece = piece.map(|mut p| {
            p.position = pos;
            p.is_alive = true;
            p
        });
        if let Some(p) = &piece {
            if let Some(old) = self.find_piece(p.id).map(|old| old.position) {
                if old != pos {
                    self.cells[old.y as usize][old.x as usize] = None;
                }
            }
        }
        self.cells[pos.y as usize][pos.x as usize] = piece;
    }

    /// 取出某格棋子
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.cells[pos.y as usize][pos.x as usize].take()
    }

    /// 不檢查規則的搬移；回傳被覆蓋的棋子（已標記為死亡）
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        if from == to || !to.is_on_board() {
            return None;
        }
        let piece = self.remove_piece(from)?;
        let captured = self.remove_piece(to).map(|mut p| {
            p.is_alive = false;
            p
        });
        self.set_piece(to, Some(piece));
        captured
    }

    pub fn find_piece(&self, id: PieceId) -> Option<&Piece> {
        self.cells.iter().flatten().flatten().find(|p| p.id == id)
    }

    pub fn find_king(&self, color: Color) -> Option<&Piece> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .find(|p| p.color == color && p.piece_type == PieceType::King)
    }

    /// 所有在棋盤上的棋子（皆為存活），依行優先順序
    pub fn get_all_pieces(&self) -> Vec<Piece> {
        self.cells.iter().flatten().flatten().copied().collect()
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.cells
            .iter()
            .flatten()
            .flatten()
            .filter(move |p| p.color == color)
    }

    /// 是否在九宮內
    pub fn is_in_palace(pos: Position, color: Color) -> bool {
        let (min_y, max_y) = match color {
            Color::Red => (RED_PALACE_MIN_Y, RED_PALACE_MAX_Y),
            Color::Black => (BLACK_PALACE_MIN_Y, BLACK_PALACE_MAX_Y),
        };
        (PALACE_MIN_X..=PALACE_MAX_X).contains(&pos.x) && (min_y..=max_y).contains(&pos.y)
    }

    /// 對 `color` 而言是否已過河
    pub fn has_river_crossed(pos: Position, color: Color) -> bool {
        match color {
            Color::Red => pos.y < RED_RIVER_EDGE,
            Color::Black => pos.y > BLACK_RIVER_EDGE,
        }
    }

    pub fn is_in_home_half(pos: Position, color: Color) -> bool {
        !Self::has_river_crossed(pos, color)
    }

    /// 兩點是否同一直線（同行或同列，不含同點）
    pub fn same_line(a: Position, b: Position) -> bool {
        a != b && (a.x == b.x || a.y == b.y)
    }

    /// 曼哈頓距離
    pub fn distance(a: Position, b: Position) -> Coord {
        (a.x - b.x).abs() + (a.y - b.y).abs()
    }

    /// 直線上兩點之間（不含端點）的棋子數；非直線回傳 None
    pub fn count_between(&self, from: Position, to: Position) -> Option<usize> {
        if !Self::same_line(from, to) {
            return None;
        }
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        let mut count = 0;
        let mut cur = from.offset(dx, dy);
        while cur != to {
            if self.get_piece(cur).is_some() {
                count += 1;
            }
            cur = cur.offset(dx, dy);
        }
        Some(count)
    }

    /// 直線路徑中間是否有棋子；斜線或同點一律視為阻擋
    pub fn is_path_blocked(&self, from: Position, to: Position) -> bool {
        self.count_between(from, to).is_none_or(|n| n > 0)
    }

    /// 以 ASCII 輸出（與 `loader::load_from_ascii` 對應）
    pub fn to_ascii(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Some(p) => p.piece_type.symbol(p.color).to_string(),
                        None => ".".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pawn(id: PieceId, color: Color) -> Piece {
        Piece::new(id, PieceType::Pawn, color, Position::default())
    }

    #[test]
    fn test_standard_layout() {
        let mut ids = IdGenerator::default();
        let board = Board::standard(&mut ids);
        assert_eq!(board.get_all_pieces().len(), 32);
        assert_eq!(
            board.find_king(Color::Red).unwrap().position,
            Position::new(4, 9)
        );
        assert_eq!(
            board.find_king(Color::Black).unwrap().position,
            Position::new(4, 0)
        );
        assert_eq!(
            board.get_piece(Position::new(1, 7)).unwrap().piece_type,
            PieceType::Cannon
        );
        assert_eq!(board.pieces_of(Color::Red).count(), 16);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut board = Board::empty();
        board.set_piece(Position::new(9, 0), Some(pawn(1, Color::Red)));
        board.set_piece(Position::new(-1, 3), Some(pawn(2, Color::Red)));
        assert!(board.get_all_pieces().is_empty());
        assert!(board.get_piece(Position::new(0, 10)).is_none());
        assert!(board.remove_piece(Position::new(0, 10)).is_none());
    }

    #[test]
    fn test_set_piece_rewrites_position_and_dedups_id() {
        let mut board = Board::empty();
        board.set_piece(Position::new(0, 0), Some(pawn(7, Color::Black)));
        board.set_piece(Position::new(3, 4), Some(pawn(7, Color::Black)));
        assert!(board.get_piece(Position::new(0, 0)).is_none());
        assert_eq!(
            board.get_piece(Position::new(3, 4)).unwrap().position,
            Position::new(3, 4)
        );
        assert_eq!(board.get_all_pieces().len(), 1);
    }

    #[test]
    fn test_palace_and_river() {
        assert!(Board::is_in_palace(Position::new(4, 9), Color::Red));
        assert!(Board::is_in_palace(Position::new(3, 7), Color::Red));
        assert!(!Board::is_in_palace(Position::new(3, 6), Color::Red));
        assert!(!Board::is_in_palace(Position::new(6, 8), Color::Red));
        assert!(Board::is_in_palace(Position::new(5, 2), Color::Black));
        assert!(!Board::is_in_palace(Position::new(5, 3), Color::Black));

        assert!(Board::has_river_crossed(Position::new(0, 4), Color::Red));
        assert!(!Board::has_river_crossed(Position::new(0, 5), Color::Red));
        assert!(Board::has_river_crossed(Position::new(0, 5), Color::Black));
        assert!(!Board::has_river_crossed(Position::new(0, 4), Color::Black));
    }

    #[test]
    fn test_path_blocked() {
        let mut board = Board::empty();
        let a = Position::new(0, 0);
        let b = Position::new(0, 5);
        assert!(!board.is_path_blocked(a, b));
        board.set_piece(Position::new(0, 3), Some(pawn(1, Color::Red)));
        assert!(board.is_path_blocked(a, b));
        assert_eq!(board.count_between(a, b), Some(1));
        // 端點不算
        assert!(!board.is_path_blocked(a, Position::new(0, 3)));
        // 斜線與同點
        assert!(board.is_path_blocked(a, Position::new(2, 2)));
        assert!(board.is_path_blocked(a, a));
        assert_eq!(board.count_between(a, Position::new(1, 2)), None);
    }

    #[test]
    fn test_move_piece_marks_captured_dead() {
        let mut board = Board::empty();
        board.set_piece(Position::new(0, 0), Some(pawn(1, Color::Red)));
        board.set_piece(Position::new(0, 1), Some(pawn(2, Color::Black)));
        let captured = board
            .move_piece(Position::new(0, 0), Position::new(0, 1))
            .unwrap();
        assert_eq!(captured.id, 2);
        assert!(!captured.is_alive);
        assert_eq!(board.get_piece(Position::new(0, 1)).unwrap().id, 1);
        assert!(board.get_piece(Position::new(0, 0)).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut board = Board::empty();
        board.set_piece(Position::new(4, 4), Some(pawn(1, Color::Red)));
        let mut copy = board.clone();
        copy.remove_piece(Position::new(4, 4));
        assert!(board.get_piece(Position::new(4, 4)).is_some());
        assert!(copy.get_piece(Position::new(4, 4)).is_none());
    }

    #[test]
    fn test_distance_and_same_line() {
        let a = Position::new(1, 1);
        assert_eq!(Board::distance(a, Position::new(4, 5)), 7);
        assert!(Board::same_line(a, Position::new(1, 9)));
        assert!(!Board::same_line(a, a));
        assert!(!Board::same_line(a, Position::new(2, 2)));
    }
}
