//! 基本資料型別：座標、陣營、棋種、棋子、走法紀錄

use crate::alias::{Coord, PieceId, Timestamp};
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// 棋盤位置（座標），x 為路 0..=8，y 為行 0..=9
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// 是否落在 9x10 棋盤內
    pub fn is_on_board(self) -> bool {
        (0..BOARD_WIDTH).contains(&self.x) && (0..BOARD_HEIGHT).contains(&self.y)
    }

    /// 平移，不檢查邊界
    pub fn offset(self, dx: Coord, dy: Coord) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// 陣營
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Color {
    Red,
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Black,
            Color::Black => Color::Red,
        }
    }

    /// 作為 `[T; 2]` 索引
    pub fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Black => 1,
        }
    }

    /// 前進方向的 y 增量：紅方往上（y 遞減），黑方往下
    pub fn forward(self) -> Coord {
        match self {
            Color::Red => -1,
            Color::Black => 1,
        }
    }
}

/// 棋種
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PieceType {
    King,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Pawn,
}

impl PieceType {
    /// ASCII 符號：紅方大寫，黑方小寫
    pub fn symbol(self, color: Color) -> char {
        let c = match self {
            PieceType::King => 'K',
            PieceType::Advisor => 'A',
            PieceType::Elephant => 'E',
            PieceType::Horse => 'H',
            PieceType::Chariot => 'R',
            PieceType::Cannon => 'C',
            PieceType::Pawn => 'P',
        };
        match color {
            Color::Red => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    /// `symbol` 的反函式
    pub fn from_symbol(c: char) -> Option<(PieceType, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::Red
        } else {
            Color::Black
        };
        let piece_type = match c.to_ascii_uppercase() {
            'K' => PieceType::King,
            'A' => PieceType::Advisor,
            'E' => PieceType::Elephant,
            'H' => PieceType::Horse,
            'R' => PieceType::Chariot,
            'C' => PieceType::Cannon,
            'P' => PieceType::Pawn,
            _ => return None,
        };
        Some((piece_type, color))
    }
}

/// 棋子
///
/// 被吃掉的棋子不會被刪除：`is_alive` 變為 false 並離開棋盤，
/// 但仍留在所屬玩家的棋子列表中（復活、移位類技能需要）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub piece_type: PieceType,
    pub color: Color,
    pub position: Position,
    pub is_alive: bool,
}

impl Piece {
    pub fn new(id: PieceId, piece_type: PieceType, color: Color, position: Position) -> Self {
        Self {
            id,
            piece_type,
            color,
            position,
            is_alive: true,
        }
    }
}

/// 已驗證、已套用的走法紀錄（不可變）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    /// 走子當下的棋子快照（位置為 `from`）
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub timestamp: Timestamp,
}

impl Move {
    /// 位移是否為馬步（日字）
    pub fn is_l_shape(&self) -> bool {
        let dx = (self.to.x - self.from.x).abs();
        let dy = (self.to.y - self.from.y).abs();
        (dx, dy) == (1, 2) || (dx, dy) == (2, 1)
    }
}
