//! 趙雲：龍膽、七進七出、勇決
use super::enable_rules;
use crate::*;
use board::component::PieceType;
use board::{Board, RuleOverride, validate_move};
use skills_lib::*;

const LONGDAN_RULES: [RuleOverride; 2] = [
    RuleOverride::PawnCanCrossRiverDirectly,
    RuleOverride::PawnCanMoveTwoStepsAfterRiver,
];

pub fn longdan() -> Skill {
    Skill::new("longdan", "龍膽", SkillKind::Passive, longdan_execute)
        .description("兵可一步過河，過河後可走兩步")
        .triggers(&[SkillTrigger::GameStart])
        .overrides(&LONGDAN_RULES)
}

fn longdan_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    Ok(enable_rules(ctx, &LONGDAN_RULES, "龍膽：兵卒靈活"))
}

pub fn qijin() -> Skill {
    Skill::new("qijin", "七進七出", SkillKind::Limited, qijin_execute)
        .description("每局一次，將一枚陣亡的己方非將帥棋子復活在己方半場的空格")
        .triggers(&[SkillTrigger::Manual])
        .can_use(qijin_can_use)
}

fn qijin_can_use(ctx: &SkillContext<'_>) -> bool {
    ctx.state
        .player(ctx.owner())
        .dead_pieces()
        .any(|p| p.piece_type != PieceType::King)
}

/// 參數：`piece_ids[0]` 要復活的棋子，`target` 落點
fn qijin_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let owner = ctx.owner();
    let piece_id = *ctx
        .params
        .piece_ids
        .first()
        .ok_or_else(|| ctx.invalid_params("需要指定棋子"))?;
    let at = ctx
        .params
        .target
        .ok_or_else(|| ctx.invalid_params("需要指定落點"))?;

    let piece = ctx
        .state
        .player(owner)
        .piece(piece_id)
        .ok_or_else(|| ctx.invalid_params(format!("棋子 {} 不屬於 {}", piece_id, owner)))?;
    if piece.is_alive {
        return Err(ctx.invalid_params(format!("棋子 {} 仍存活", piece_id)));
    }
    if piece.piece_type == PieceType::King {
        return Err(ctx.invalid_params("將帥不能復活"));
    }
    if !at.is_on_board() || !Board::is_in_home_half(at, owner) {
        return Err(ctx.invalid_params(format!("{:?} 不在己方半場", at)));
    }
    if ctx.state.board.get_piece(at).is_some() {
        return Err(ctx.invalid_params(format!("{:?} 已有棋子", at)));
    }
    Ok(SkillOutcome::fired(format!("七進七出：{} 復活", piece.piece_type))
        .with_delta(StateDelta::new().push(StateChange::Revive { piece_id, at })))
}

pub fn yongjue() -> Skill {
    Skill::new("yongjue", "勇決", SkillKind::Passive, yongjue_execute)
        .description("己方走動的棋子直接將軍時可再走一步，但不能走車、炮、馬")
        .triggers(&[SkillTrigger::OnCheck])
        .max_usages(2)
}

fn yongjue_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let Some(mv) = ctx.event.current_move else {
        return Ok(SkillOutcome::skipped("沒有走法"));
    };
    if !ctx.is_own_move() {
        return Ok(SkillOutcome::skipped("不是己方將軍"));
    }
    let Some(king) = ctx.state.board.find_king(ctx.owner().opponent()) else {
        return Ok(SkillOutcome::skipped("對方將帥不在場"));
    };
    // 只認剛走的那枚棋子直接將軍
    let rules = ctx.state.player(ctx.owner()).rules.move_rules();
    if validate_move(&ctx.state.board, &[], mv.to, king.position, rules).is_err() {
        return Ok(SkillOutcome::skipped("不是走動的棋子將軍"));
    }
    Ok(SkillOutcome::fired("勇決：乘勝再進").with_turn_state(TurnState::extra_move(
        1,
        &[PieceType::Chariot, PieceType::Cannon, PieceType::Horse],
    )))
}
