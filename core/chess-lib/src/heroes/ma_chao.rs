//! 馬超：鐵騎、奔襲
use super::enable_rules;
use crate::*;
use board::RuleOverride;
use board::component::PieceType;
use skills_lib::*;

const TIEQI_RULES: [RuleOverride; 2] = [
    RuleOverride::HorseIgnoreLegBlock,
    RuleOverride::HorseLimitConsecutiveJumps,
];

pub fn tieqi() -> Skill {
    Skill::new("tieqi", "鐵騎", SkillKind::Locked, tieqi_execute)
        .description("馬不受蹩腳限制，但同一匹馬不可連續兩步都走日字")
        .triggers(&[SkillTrigger::GameStart])
        .overrides(&TIEQI_RULES)
}

fn tieqi_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    Ok(enable_rules(ctx, &TIEQI_RULES, "鐵騎：馬不受蹩腳"))
}

pub fn benxi() -> Skill {
    Skill::new("benxi", "奔襲", SkillKind::Passive, benxi_execute)
        .description("己方馬吃子後可再走一步，但這一步不能走馬")
        .triggers(&[SkillTrigger::AfterMove])
        .priority(5)
}

fn benxi_execute(ctx: &SkillContext<'_>) -> Result<SkillOutcome, Error> {
    let Some(mv) = ctx.event.current_move else {
        return Ok(SkillOutcome::skipped("沒有走法"));
    };
    if !ctx.is_own_move() || mv.piece.piece_type != PieceType::Horse || mv.captured.is_none() {
        return Ok(SkillOutcome::skipped("不是己方馬吃子"));
    }
    Ok(SkillOutcome::fired("奔襲：再走一步")
        .with_turn_state(TurnState::extra_move(1, &[PieceType::Horse])))
}
