//! 英雄象棋對局核心：技能引擎、狀態變更、英雄技能目錄與對局流程
mod config;
mod delta;
mod engine;
mod error;
mod game;
pub mod heroes;
mod skill;
mod state;

pub use config::*;
pub use delta::*;
pub use engine::*;
pub use error::*;
pub use game::*;
pub use skill::*;
pub use state::*;
