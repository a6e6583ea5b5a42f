//! 象棋棋盤核心：座標、棋子、棋盤幾何、規則覆寫與走法驗證
//!
//! 本 crate 不知道英雄與技能，只回答「這步棋在這組規則下是否合法」。

pub mod alias;
pub mod component;
pub mod constants;
pub mod error;
pub mod loader;
pub mod logic;

pub use component::{Color, Move, Piece, PieceType, Position};
pub use logic::board::Board;
pub use logic::id_generator::IdGenerator;
pub use logic::movement::{IllegalMove, is_in_check, legal_destinations, validate_move};
pub use logic::rule_context::{MoveRules, RuleContext, RuleOverride};
