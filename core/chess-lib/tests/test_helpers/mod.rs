//! 測試輔助：以 ASCII 盤面開局、快速走子
#![allow(dead_code)]

use board::component::{Piece, Position};
use board::loader::load_from_ascii;
use chess_lib::*;
use skills_lib::HeroDef;

/// 沒有技能的英雄，用來當對手
pub const PLAIN: &str = "plain";

/// 設 `RUST_LOG=chess_lib=debug` 可看到技能觸發紀錄
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn manager_with(config: EngineConfig) -> GameManager {
    init_tracing();
    let mut roster = heroes::default_roster().unwrap();
    roster.heroes.push(HeroDef {
        id: PLAIN.to_string(),
        name: "白板".to_string(),
        description: String::new(),
        skills: Vec::new(),
    });
    GameManager::with_roster(config, roster)
}

pub fn manager() -> GameManager {
    manager_with(EngineConfig::default())
}

/// 以 ASCII 盤面開局，第一行為 y = 0（黑方底線）
pub fn start_with(
    mut manager: GameManager,
    ascii: &str,
    red: &str,
    black: &str,
) -> (GameManager, GameState) {
    let (board, _) = load_from_ascii(ascii).unwrap();
    let report = manager.setup(board, red, black).unwrap();
    (manager, report.state)
}

pub fn start(ascii: &str, red: &str, black: &str) -> (GameManager, GameState) {
    start_with(manager(), ascii, red, black)
}

pub fn request(from: (i32, i32), to: (i32, i32)) -> MoveRequest {
    MoveRequest::new(Position::new(from.0, from.1), Position::new(to.0, to.1))
}

/// 走子並回傳新狀態，失敗即 panic
pub fn play(
    manager: &mut GameManager,
    state: &GameState,
    from: (i32, i32),
    to: (i32, i32),
) -> MoveReport {
    manager
        .execute_move(state, &request(from, to))
        .unwrap_or_else(|e| panic!("move {:?} -> {:?} failed: {}", from, to, e))
}

pub fn piece_at(state: &GameState, x: i32, y: i32) -> Piece {
    *state
        .board
        .get_piece(Position::new(x, y))
        .unwrap_or_else(|| panic!("no piece at ({}, {})", x, y))
}

pub fn fired_ids(fired: &[FiredSkill]) -> Vec<&str> {
    fired.iter().map(|f| f.key.id.as_str()).collect()
}
