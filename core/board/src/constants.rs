//! 棋盤常數定義

use crate::alias::Coord;

/// 棋盤寬（九路）
pub const BOARD_WIDTH: Coord = 9;

/// 棋盤高（十行）
pub const BOARD_HEIGHT: Coord = 10;

/// 九宮左右邊界
pub const PALACE_MIN_X: Coord = 3;
pub const PALACE_MAX_X: Coord = 5;

/// 紅方九宮（下方）
pub const RED_PALACE_MIN_Y: Coord = 7;
pub const RED_PALACE_MAX_Y: Coord = 9;

/// 黑方九宮（上方）
pub const BLACK_PALACE_MIN_Y: Coord = 0;
pub const BLACK_PALACE_MAX_Y: Coord = 2;

/// 紅方過河：y < 5；黑方過河：y > 4
pub const RED_RIVER_EDGE: Coord = 5;
pub const BLACK_RIVER_EDGE: Coord = 4;

/// 兵卒起始行
pub const RED_PAWN_ROW: Coord = 6;
pub const BLACK_PAWN_ROW: Coord = 3;

/// 兵卒起始列
pub const PAWN_FILES: [Coord; 5] = [0, 2, 4, 6, 8];
