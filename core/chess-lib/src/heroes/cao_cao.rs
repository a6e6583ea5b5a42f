//! 曹操：屯田、挾天子
//!
//! 屯田吃兵累積標記，標記達門檻時喚醒挾天子；
//! 挾天子花掉門檻數量的標記，清空己方河岸兩行的敵子，並在己方兵線補滿五兵。
use crate::*;
use board::component::{Color, Piece, PieceType, Position};
use board::constants::{
    BLACK_PAWN_ROW, BLACK_RIVER_EDGE, BOARD_WIDTH, PAWN_FILES, RED_PAWN_ROW, RED_RIVER_EDGE,
};
use skills_lib::*;

pub fn tuntian() -> Skill {
    Skill::new("tuntian", "屯田", SkillKind::Passive, tuntian_execute)
        .description("己方吃掉兵卒時獲得 1 枚標記，標記達門檻時覺醒挾天子")
        .triggers(&[SkillTrigger::OnCapture])
        .priority(10)
}

fn tuntian_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let owner = ctx.owner();
    let captured_pawn = ctx
        .event
        .captured
        .is_some_and(|p| p.piece_type == PieceType::Pawn);
    if !ctx.is_own_move() || !captured_pawn {
        return Ok(SkillOutcome::skipped("沒有吃兵"));
    }

    let total = ctx.state.markers_of(owner) + 1;
    let mut delta = StateDelta::new().push(StateChange::AddMarkers {
        color: owner,
        amount: 1,
    });
    if total >= ctx.config.marker_awaken_threshold {
        delta = delta.push(StateChange::Awaken {
            owner,
            skill_id: "xietianzi".to_string(),
        });
    }
    Ok(SkillOutcome::fired(format!("屯田：標記 {}", total)).with_delta(delta))
}

pub fn xietianzi() -> Skill {
    Skill::new("xietianzi", "挾天子", SkillKind::Awakening, xietianzi_execute)
        .description("覺醒後，己方走子後或手動花費標記，清除己方河岸兩行的敵子並補滿兵線")
        .triggers(&[SkillTrigger::AfterMove, SkillTrigger::Manual])
        .can_use(has_enough_markers)
}

fn has_enough_markers(ctx: &SkillContext<'_>) -> bool {
    ctx.state.markers_of(ctx.owner()) >= ctx.config.marker_awaken_threshold
}

/// 己方河岸（河界一行加兵線一行）
fn bank_rows(color: Color) -> [i32; 2] {
    match color {
        Color::Red => [RED_RIVER_EDGE, RED_PAWN_ROW],
        Color::Black => [BLACK_RIVER_EDGE, BLACK_PAWN_ROW],
    }
}

fn pawn_row(color: Color) -> i32 {
    match color {
        Color::Red => RED_PAWN_ROW,
        Color::Black => BLACK_PAWN_ROW,
    }
}

fn xietianzi_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let owner = ctx.owner();
    if ctx.trigger != SkillTrigger::Manual && !ctx.is_own_move() {
        return Ok(SkillOutcome::skipped("不是己方走子"));
    }
    if !has_enough_markers(ctx) {
        return Ok(SkillOutcome::skipped("標記不足"));
    }

    let mut delta = StateDelta::new().push(StateChange::AddMarkers {
        color: owner,
        amount: -ctx.config.marker_awaken_threshold,
    });

    // 將帥不受影響，避免技能直接分出勝負
    let is_enemy = |p: &&Piece| p.color != owner && p.piece_type != PieceType::King;
    for y in bank_rows(owner) {
        for x in 0..BOARD_WIDTH {
            let at = Position::new(x, y);
            if ctx.state.board.get_piece(at).filter(is_enemy).is_some() {
                delta = delta.push(StateChange::Remove { at });
            }
        }
    }

    let row = pawn_row(owner);
    for x in PAWN_FILES {
        let at = Position::new(x, row);
        let own_pawn = ctx
            .state
            .board
            .get_piece(at)
            .is_some_and(|p| p.color == owner && p.piece_type == PieceType::Pawn);
        if !own_pawn {
            delta = delta.push(StateChange::Spawn {
                color: owner,
                piece_type: PieceType::Pawn,
                at,
            });
        }
    }

    Ok(SkillOutcome::fired("挾天子：號令天下").with_delta(delta))
}
