//! 型別別名

/// 棋盤座標分量（允許負值以表達棋盤外的位置）
pub type Coord = i32;

/// 棋子唯一 ID，整局遊戲內不重複使用
pub type PieceId = u64;

/// 走法時間戳，由呼叫端提供
pub type Timestamp = u64;
