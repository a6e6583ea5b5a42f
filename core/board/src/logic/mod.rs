//! 核心棋盤邏輯

pub mod board;
pub mod id_generator;
pub mod movement;
pub mod rule_context;
