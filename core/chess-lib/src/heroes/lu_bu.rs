//! 呂布：飛將、無雙、對決
use super::enable_rules;
use crate::*;
use board::RuleOverride;
use board::component::{PieceType, Position};
use skills_lib::*;

const FEIJIANG_RULES: [RuleOverride; 2] = [
    RuleOverride::KingCanLeavePalace,
    RuleOverride::AdvisorCanLeavePalace,
];

pub fn feijiang() -> Skill {
    Skill::new("feijiang", "飛將", SkillKind::Passive, feijiang_execute)
        .description("將帥與仕可離開九宮")
        .triggers(&[SkillTrigger::GameStart])
        .overrides(&FEIJIANG_RULES)
}

fn feijiang_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    Ok(enable_rules(ctx, &FEIJIANG_RULES, "飛將：出宮迎敵"))
}

pub fn wushuang() -> Skill {
    Skill::new("wushuang", "無雙", SkillKind::Locked, wushuang_execute)
        .description("己方將帥吃子後必須再以將帥連走兩步")
        .triggers(&[SkillTrigger::AfterMove])
        .priority(8)
}

fn wushuang_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let Some(mv) = ctx.event.current_move else {
        return Ok(SkillOutcome::skipped("沒有走法"));
    };
    if !ctx.is_own_move() || mv.piece.piece_type != PieceType::King || mv.captured.is_none() {
        return Ok(SkillOutcome::skipped("不是己方將帥吃子"));
    }
    Ok(SkillOutcome::fired("無雙：將帥連走兩步")
        .with_turn_state(TurnState::force_move(mv.piece.id, 2)))
}

pub fn duijue() -> Skill {
    Skill::new("duijue", "對決", SkillKind::Limited, duijue_execute)
        .description("每局一次，雙方將帥互換所在的路")
        .triggers(&[SkillTrigger::Manual])
        .can_use(kings_on_different_files)
}

fn kings_on_different_files(ctx: &SkillContext<'_>) -> bool {
    let board = &ctx.state.board;
    match (
        board.find_king(ctx.owner()),
        board.find_king(ctx.owner().opponent()),
    ) {
        (Some(own), Some(enemy)) => own.position.x != enemy.position.x,
        _ => false,
    }
}

fn duijue_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let board = &ctx.state.board;
    let (Some(own), Some(enemy)) = (
        board.find_king(ctx.owner()),
        board.find_king(ctx.owner().opponent()),
    ) else {
        return Err(ctx.invalid_params("雙方將帥都必須在場"));
    };
    if own.position.x == enemy.position.x {
        return Err(ctx.invalid_params("將帥已在同一路"));
    }
    let delta = StateDelta::new()
        .push(StateChange::Relocate {
            piece_id: own.id,
            to: Position::new(enemy.position.x, own.position.y),
        })
        .push(StateChange::Relocate {
            piece_id: enemy.id,
            to: Position::new(own.position.x, enemy.position.y),
        });
    Ok(SkillOutcome::fired("對決：將帥換路").with_delta(delta))
}
